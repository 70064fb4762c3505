//! # rustspringer
//!
//! Download the books listed in a Springer spreadsheet using cookies
//! exported from a logged-in browser session.
//!
//! ## Modules
//!
//! - [`sheet`] - Workbook reading and fixed-column book records
//! - [`filter`] - Topic/ISBN selection
//! - [`prompt`] - Interactive yes/no confirmation
//! - [`cookies`] - Exported cookie file loading
//! - [`fetcher`] - Listing page scraping and PDF download
//! - [`writer`] - Content-disposition filenames and saving to disk
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustspringer::{cookies::CookieJar, fetcher::BookFetcher, filter::FilterCriteria, sheet};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let workbook = sheet::Sheet::open(Path::new("books.xlsx"), None)?;
//!     let criteria = FilterCriteria::new(Some("Mathematics".to_string()), None);
//!     let books = sheet::list_books(&workbook, &criteria);
//!
//!     let cookies = CookieJar::load(Path::new("cookies.txt"))?;
//!     let summary = BookFetcher::new(&cookies, ".")?.download_all(&books).await;
//!     println!("Downloaded {} of {} books", summary.saved.len(), summary.total());
//!     Ok(())
//! }
//! ```

pub mod cookies;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod prompt;
pub mod sheet;
pub mod writer;

pub use error::{Result, SpringerError};
