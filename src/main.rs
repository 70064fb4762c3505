//! rustspringer - download Springer books listed in a spreadsheet
//!
//! ## Usage
//!
//! ```bash
//! # List the topics in the workbook
//! rustspringer books.xlsx cookies.txt --topics
//!
//! # List the books of one topic
//! rustspringer books.xlsx cookies.txt --list --topic "Mathematics"
//!
//! # Download them, confirming each one
//! rustspringer books.xlsx cookies.txt --topic "Mathematics" --interactive
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rustspringer::{
    cookies::CookieJar,
    fetcher::BookFetcher,
    filter::FilterCriteria,
    prompt,
    sheet::{self, BookRecord, Sheet},
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Download books from Springer
#[derive(Parser)]
#[command(name = "rustspringer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// The Excel file containing the book list
    xlfile: PathBuf,

    /// The exported cookies file
    cookies: PathBuf,

    /// Only list books
    #[arg(short, long, conflicts_with = "topics")]
    list: bool,

    /// Only list topics
    #[arg(short = 'a', long)]
    topics: bool,

    /// Prompt for user input if required
    #[arg(short = 'p', long)]
    interactive: bool,

    /// Use the given topic
    #[arg(short, long)]
    topic: Option<String>,

    /// Use the given ISBN
    #[arg(short, long)]
    isbn: Option<String>,

    /// Worksheet to read (default: the first one)
    #[arg(long)]
    sheet: Option<String>,

    /// Directory the topic folders are created in
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let Some(workbook) = load_workbook(&cli.xlfile, cli.sheet.as_deref(), &mut std::io::stdout())
    else {
        return Ok(());
    };

    let criteria = FilterCriteria::new(cli.topic.clone(), cli.isbn.clone());

    if cli.list {
        sheet::write_books(&sheet::list_books(&workbook, &criteria), &mut std::io::stdout())?;
    } else if cli.topics {
        sheet::write_topics(&sheet::list_topics(&workbook, &criteria), &mut std::io::stdout())?;
    } else {
        let books = sheet::list_books(&workbook, &criteria);
        let books = if cli.interactive {
            let stdin = std::io::stdin();
            prompt::select_interactively(books, &mut stdin.lock(), &mut std::io::stdout())
                .context("Failed to read confirmation")?
        } else {
            books
        };
        run_downloads(&books, &cli.cookies, &cli.output).await?;
    }

    Ok(())
}

// ============================================================================
// Download Pipeline
// ============================================================================

async fn run_downloads(books: &[BookRecord], cookies_path: &Path, output: &Path) -> Result<()> {
    let cookies = CookieJar::load(cookies_path)
        .with_context(|| format!("Failed to load cookies from {:?}", cookies_path))?;
    if cookies.is_empty() {
        println!("Warning: no usable cookies in {:?}, downloads will likely fail", cookies_path);
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {:?}", output))?;

    let fetcher = BookFetcher::new(&cookies, output)?;
    info!(books = books.len(), output = ?output, "Starting downloads");

    let summary = fetcher.download_all(books).await;

    println!();
    println!("Downloaded {} of {} books", summary.saved.len(), summary.total());
    if !summary.failed.is_empty() {
        println!("Failed: {}", summary.failed.len());
        for failed in &summary.failed {
            println!("  {}: {}", failed.title, failed.error);
        }
    }

    Ok(())
}

// ============================================================================
// Workbook Loading
// ============================================================================

/// Open the workbook, reporting a failure to `out` instead of aborting.
///
/// A workbook that cannot be loaded ends the run before any download, but
/// the process still exits successfully.
fn load_workbook<W: Write>(path: &Path, sheet_name: Option<&str>, out: &mut W) -> Option<Sheet> {
    match Sheet::open(path, sheet_name) {
        Ok(workbook) => Some(workbook),
        Err(e) => {
            error!(path = ?path, error = %e, "Failed to load workbook");
            // Nothing more useful to do if stdout itself is gone
            writeln!(out, "Error: {}", e).ok();
            None
        }
    }
}
