//! Saving downloaded PDFs to `<root>/<topic>/<filename>`.

use crate::error::{Result, SpringerError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extract the server-suggested filename from a content-disposition value.
///
/// Supports `filename="quoted"`, `filename=token` and the RFC 5987
/// `filename*=UTF-8''percent%20encoded` form, which wins when both appear.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let star_regex = Regex::new(r"(?i)filename\*\s*=\s*UTF-8''([^;\s]+)").ok()?;
    let plain_regex =
        Regex::new(r#"(?i)filename\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^;]+))"#).ok()?;

    if let Some(caps) = star_regex.captures(header) {
        if let Ok(decoded) = urlencoding::decode(&caps[1]) {
            if !decoded.is_empty() {
                return Some(decoded.into_owned());
            }
        }
    }

    let caps = plain_regex.captures(header)?;
    let name = match (caps.get(1), caps.get(2)) {
        (Some(quoted), _) => quoted.as_str().replace("\\\"", "\"").replace("\\\\", "\\"),
        (None, Some(token)) => token.as_str().trim().to_string(),
        (None, None) => return None,
    };
    (!name.is_empty()).then_some(name)
}

/// Accept a filename only if it is a single, ordinary path component.
pub fn sanitize_filename(name: &str) -> Result<&str> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if unsafe_name {
        return Err(SpringerError::UnsafeFilename(name.to_string()));
    }
    Ok(name)
}

/// Directory name for a topic.
///
/// Path separators are replaced so a topic is always exactly one directory level.
pub fn topic_dir_name(topic: &str) -> Result<String> {
    let name = topic.replace(['/', '\\'], "_").replace('\0', "");
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(SpringerError::InvalidTopic(topic.to_string()));
    }
    Ok(name.to_string())
}

/// Write a PDF under `root/<topic>/`, creating the topic directory if needed.
///
/// Only the topic directory itself is created; `root` must already exist.
pub fn save_pdf(root: &Path, topic: &str, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let filename = sanitize_filename(filename)?;
    let dir = root.join(topic_dir_name(topic)?);
    if !dir.is_dir() {
        debug!(dir = ?dir, "Creating topic directory");
        fs::create_dir(&dir)?;
    }

    let path = dir.join(filename);
    fs::write(&path, content)?;
    debug!(path = ?path, bytes = content.len(), "Wrote PDF");
    Ok(path)
}
