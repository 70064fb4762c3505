//! Custom error types for rustspringer.
//!
//! Library functions return `Result<T, SpringerError>`. Whether an error is
//! fatal for the run or only skips one book is decided by the caller.

use thiserror::Error;

/// Main error type for rustspringer operations.
#[derive(Debug, Error)]
pub enum SpringerError {
    /// Workbook could not be opened or read
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// CSV workbook could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Requested worksheet does not exist or the workbook has none
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    /// A data row does not reach the last bound column
    #[error("Row {row} has {len} columns, expected at least {expected}")]
    ShortRow {
        /// 1-based row number as shown by spreadsheet software
        row: usize,
        /// Number of cells present in the row
        len: usize,
        /// Number of cells required by the column bindings
        expected: usize,
    },

    /// Cookie file could not be parsed
    #[error("Cookie file error: {0}")]
    Cookies(String),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with something other than 200 OK
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Status code returned by the server
        status: u16,
        /// Requested URL
        url: String,
    },

    /// HTML parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Listing URL from the workbook is not a valid absolute URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Listing page has no PDF download anchor
    #[error("No PDF download link on {0}")]
    MissingDownloadLink(String),

    /// PDF response carries no usable content-disposition filename
    #[error("No filename in content-disposition header")]
    MissingFilename,

    /// Server-suggested filename cannot be used as a single path component
    #[error("Refusing unsafe filename {0:?}")]
    UnsafeFilename(String),

    /// Topic cannot be used as a directory name
    #[error("Unusable topic directory {0:?}")]
    InvalidTopic(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `SpringerError`
pub type Result<T> = std::result::Result<T, SpringerError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a cookie parse error message
    fn ok_or_cookies(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_cookies(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| SpringerError::Cookies(msg.to_string()))
    }
}
