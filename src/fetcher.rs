//! Book download: listing page → PDF link → PDF file.
//!
//! Every request carries the run's cookie jar. Books are processed one at a
//! time and a failure only skips the book it happened on.

use crate::cookies::CookieJar;
use crate::error::{Result, SpringerError};
use crate::sheet::BookRecord;
use crate::writer::{filename_from_content_disposition, save_pdf, topic_dir_name};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Title attribute of the anchor that links to a book's PDF
pub const PDF_ANCHOR_TITLE: &str = "Download this book in PDF format";

/// A book written to disk
#[derive(Debug, Clone)]
pub struct SavedBook {
    pub title: String,
    pub path: PathBuf,
}

impl fmt::Display for SavedBook {
    /// Names the directory the file actually landed in, which is the
    /// topic after path separators were replaced.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_of = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        write!(
            f,
            "Saved {} to {} in directory {}",
            self.title,
            name_of(Some(self.path.as_path())),
            name_of(self.path.parent())
        )
    }
}

/// A book that was skipped, with the reason
#[derive(Debug)]
pub struct FailedBook {
    pub title: String,
    pub error: SpringerError,
}

/// Outcome of a download run
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub saved: Vec<SavedBook>,
    pub failed: Vec<FailedBook>,
}

impl DownloadSummary {
    pub fn total(&self) -> usize {
        self.saved.len() + self.failed.len()
    }
}

/// Find the PDF download anchor on a listing page and resolve its link.
///
/// The anchor is the first `<a>` whose `title` attribute equals
/// `anchor_title` exactly. Its `href` is resolved against `listing_url`.
///
/// # Returns
///
/// `None` when there is no such anchor or it has no `href`.
pub fn find_pdf_link(html: &str, listing_url: &Url, anchor_title: &str) -> Result<Option<Url>> {
    let document = Html::parse_document(html);
    let anchor_selector =
        Selector::parse("a[title]").map_err(|e| SpringerError::Parse(e.to_string()))?;

    let href = document
        .select(&anchor_selector)
        .find(|a| a.value().attr("title") == Some(anchor_title))
        .and_then(|a| a.value().attr("href"));

    match href {
        Some(href) => Ok(Some(listing_url.join(href.trim())?)),
        None => Ok(None),
    }
}

/// HTTP client for listing pages and PDFs
pub struct BookFetcher {
    client: reqwest::Client,
    output_root: PathBuf,
    anchor_title: String,
}

impl BookFetcher {
    /// Create a fetcher that authenticates with `cookies` and saves under `output_root`.
    pub fn new(cookies: &CookieJar, output_root: impl Into<PathBuf>) -> Result<Self> {
        let jar = Arc::new(cookies.to_reqwest_jar()?);
        let client = reqwest::Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(|e| SpringerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            output_root: output_root.into(),
            anchor_title: PDF_ANCHOR_TITLE.to_string(),
        })
    }

    /// Look for a different download anchor title.
    pub fn with_anchor_title(mut self, anchor_title: impl Into<String>) -> Self {
        self.anchor_title = anchor_title.into();
        self
    }

    /// GET a URL, failing on anything but 200 OK.
    async fn get_ok(&self, url: &Url) -> Result<reqwest::Response> {
        debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SpringerError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Fetch a listing page and resolve the absolute PDF URL on it.
    pub async fn resolve_pdf_url(&self, listing_url: &Url) -> Result<Url> {
        let html = self.get_ok(listing_url).await?.text().await?;
        find_pdf_link(&html, listing_url, &self.anchor_title)?
            .ok_or_else(|| SpringerError::MissingDownloadLink(listing_url.to_string()))
    }

    /// Download one book's PDF into its topic directory.
    ///
    /// # Errors
    ///
    /// Returns error if the listing URL or topic is unusable, a request
    /// does not answer 200, the page has no download link, the PDF response
    /// has no usable filename, or the file cannot be written.
    pub async fn download(&self, book: &BookRecord) -> Result<SavedBook> {
        topic_dir_name(&book.topic)?;
        let listing_url = Url::parse(book.url.trim())?;

        let pdf_url = self.resolve_pdf_url(&listing_url).await?;
        debug!(title = %book.title, pdf = %pdf_url, "Resolved PDF link");

        let response = self.get_ok(&pdf_url).await?;
        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_content_disposition)
            .ok_or(SpringerError::MissingFilename)?;

        let content = response.bytes().await?;
        let path = save_pdf(&self.output_root, &book.topic, &filename, &content)?;

        Ok(SavedBook {
            title: book.title.clone(),
            path,
        })
    }

    /// Download every book in order, skipping the ones that fail.
    pub async fn download_all(&self, books: &[BookRecord]) -> DownloadSummary {
        let mut summary = DownloadSummary::default();

        for book in books {
            println!("Attempting to download book {}", book.title);

            match self.download(book).await {
                Ok(saved) => {
                    println!("{}", saved);
                    info!(title = %saved.title, path = ?saved.path, "Saved book");
                    summary.saved.push(saved);
                }
                Err(e) => {
                    println!("Unable to download {}", book.title);
                    warn!(title = %book.title, error = %e, "Download failed");
                    summary.failed.push(FailedBook {
                        title: book.title.clone(),
                        error: e,
                    });
                }
            }
        }

        summary
    }
}
