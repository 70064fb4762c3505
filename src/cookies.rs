//! Cookie jar loaded from an exported browser cookie file.
//!
//! The jar is a plain list of cookies. Two export formats are understood:
//! the Netscape/Mozilla `cookies.txt` layout written by curl, wget and most
//! cookie-export extensions, and a JSON array in Playwright's cookie format.
//! Conversion into something the HTTP client can attach happens in
//! [`CookieJar::to_reqwest_jar`].

use crate::error::{OptionExt, Result, SpringerError};
use chrono::Utc;
use reqwest::cookie::Jar;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// First-line marker of a Netscape cookie file (`# HTTP Cookie File` is accepted too)
const NETSCAPE_MAGIC: &str = "HTTP Cookie File";

/// Prefix curl puts in front of the domain of HttpOnly cookies
const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

/// Cookie entry, serde-compatible with Playwright's cookie format
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, rename = "httpOnly", alias = "http_only")]
    pub http_only: bool,
    /// Unix timestamp; `None`, zero or negative for session cookies
    #[serde(default, alias = "expirationDate")]
    pub expires: Option<f64>,
    /// Netscape include-subdomains flag; JSON exports mark this with a leading dot
    #[serde(skip)]
    pub domain_specified: bool,
}

impl Cookie {
    /// Session cookies never expire within a run.
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires, Some(t) if t > 0.0 && t < now as f64)
    }

    /// Whether the cookie is sent to subdomains as well as its own host.
    pub fn include_subdomains(&self) -> bool {
        self.domain_specified || self.domain.starts_with('.')
    }

    fn host(&self) -> &str {
        self.domain.trim_start_matches('.')
    }

    fn path_or_root(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }

    /// Render as a `Set-Cookie` value scoped to this cookie's domain and path.
    fn set_cookie_string(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path_or_root());
        if self.include_subdomains() {
            out.push_str("; Domain=");
            out.push_str(self.host());
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }

    /// URL the cookie is "set from" when feeding it to a cookie store.
    fn origin_url(&self) -> Result<Url> {
        if self.host().is_empty() {
            return Err(SpringerError::Cookies(format!(
                "cookie {:?} has no domain",
                self.name
            )));
        }
        Ok(Url::parse(&format!(
            "https://{}{}",
            self.host(),
            self.path_or_root()
        ))?)
    }
}

/// Read-only set of cookies for one run
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Load cookies from an exported cookie file.
    ///
    /// Session cookies are kept and expired cookies are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is in neither format.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let jar = Self::parse(&content)?;
        info!("Loaded {} cookies from {:?}", jar.len(), path);
        Ok(jar)
    }

    /// Parse cookie file content, detecting JSON by its opening bracket.
    pub fn parse(content: &str) -> Result<Self> {
        let now = Utc::now().timestamp();
        if content.trim_start().starts_with('[') {
            Self::parse_json(content, now)
        } else {
            Self::parse_netscape(content, now)
        }
    }

    /// Parse the Netscape `cookies.txt` format.
    ///
    /// Each non-comment line has seven tab-separated fields:
    /// `domain  include_subdomains  path  secure  expiry  name  value`
    pub fn parse_netscape(content: &str, now: i64) -> Result<Self> {
        let mut lines = content.lines().enumerate();

        let magic = lines.next().map(|(_, l)| l.trim()).unwrap_or_default();
        if !(magic.starts_with('#') && magic.contains(NETSCAPE_MAGIC)) {
            return Err(SpringerError::Cookies(
                "does not look like a Netscape format cookies file".to_string(),
            ));
        }

        let mut cookies = Vec::new();
        for (idx, raw) in lines {
            let mut line = raw;
            let mut http_only = false;
            if let Some(rest) = line.strip_prefix(HTTP_ONLY_PREFIX) {
                line = rest;
                http_only = true;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('$') {
                continue;
            }

            let cookie = parse_netscape_line(line, http_only)
                .ok_or_cookies(&format!("invalid cookie on line {}", idx + 1))?;
            if cookie.is_expired(now) {
                debug!(name = %cookie.name, domain = %cookie.domain, "Skipping expired cookie");
                continue;
            }
            cookies.push(cookie);
        }

        Ok(Self { cookies })
    }

    /// Parse a JSON array of cookies.
    pub fn parse_json(content: &str, now: i64) -> Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(content)?;
        let total = cookies.len();
        let cookies: Vec<Cookie> = cookies.into_iter().filter(|c| !c.is_expired(now)).collect();
        if cookies.len() < total {
            debug!(dropped = total - cookies.len(), "Skipping expired cookies");
        }
        Ok(Self { cookies })
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Build a cookie store for the HTTP client.
    ///
    /// Each cookie is registered against its own domain and path, so requests
    /// only carry the cookies that apply to their host.
    pub fn to_reqwest_jar(&self) -> Result<Jar> {
        let jar = Jar::default();
        for cookie in &self.cookies {
            let url = cookie.origin_url()?;
            jar.add_cookie_str(&cookie.set_cookie_string(), &url);
        }
        Ok(jar)
    }
}

fn parse_netscape_line(line: &str, http_only: bool) -> Option<Cookie> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() != 7 {
        return None;
    }

    let expires = match parts[4].trim() {
        "" => None,
        raw => Some(raw.parse::<i64>().ok()? as f64),
    };

    // curl writes "name-less" cookies with the text in the value column
    let (name, value) = if parts[5].is_empty() {
        (parts[6].to_string(), String::new())
    } else {
        (parts[5].to_string(), parts[6].to_string())
    };

    Some(Cookie {
        name,
        value,
        domain: parts[0].to_string(),
        path: parts[2].to_string(),
        secure: parts[3].eq_ignore_ascii_case("TRUE"),
        http_only,
        expires,
        domain_specified: parts[1].eq_ignore_ascii_case("TRUE"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const NOW: i64 = 1_700_000_000;

    fn netscape(lines: &[&str]) -> String {
        let mut out = String::from("# Netscape HTTP Cookie File\n# exported\n\n");
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_parse_netscape() -> Result<()> {
        let content = netscape(&[
            ".springer.com\tTRUE\t/\tTRUE\t1900000000\tsid\tabc123",
            "link.springer.com\tFALSE\t/book\tFALSE\t0\tidp\txyz",
        ]);
        let jar = CookieJar::parse_netscape(&content, NOW)?;
        assert_eq!(jar.len(), 2);

        let first = jar.iter().next().expect("first cookie");
        assert_eq!(first.name, "sid");
        assert_eq!(first.value, "abc123");
        assert!(first.secure);
        assert!(first.include_subdomains());
        assert_eq!(first.expires, Some(1_900_000_000.0));
        Ok(())
    }

    #[test]
    fn test_session_kept_expired_dropped() -> Result<()> {
        let content = netscape(&[
            ".springer.com\tTRUE\t/\tFALSE\t\tsession\tkeep",
            ".springer.com\tTRUE\t/\tFALSE\t1000\told\tgone",
        ]);
        let jar = CookieJar::parse_netscape(&content, NOW)?;
        let names: Vec<&str> = jar.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["session"]);
        Ok(())
    }

    #[test]
    fn test_http_only_prefix() -> Result<()> {
        let content = netscape(&["#HttpOnly_.springer.com\tTRUE\t/\tTRUE\t0\tauth\ttoken"]);
        let jar = CookieJar::parse_netscape(&content, NOW)?;
        let cookie = jar.iter().next().expect("cookie");
        assert!(cookie.http_only);
        assert_eq!(cookie.domain, ".springer.com");
        Ok(())
    }

    #[test]
    fn test_missing_magic_rejected() {
        let content = ".springer.com\tTRUE\t/\tTRUE\t0\tauth\ttoken\n";
        assert!(matches!(
            CookieJar::parse_netscape(content, NOW),
            Err(SpringerError::Cookies(_))
        ));
    }

    #[test]
    fn test_malformed_line_rejected() {
        let content = netscape(&["springer.com\tTRUE\t/"]);
        let err = CookieJar::parse_netscape(&content, NOW).expect_err("short line");
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_parse_json() -> Result<()> {
        let content = r#"[
            {"name": "sid", "value": "abc", "domain": ".springer.com", "path": "/",
             "secure": true, "httpOnly": true, "expires": -1},
            {"name": "old", "value": "x", "domain": ".springer.com", "expires": 1000}
        ]"#;
        let jar = CookieJar::parse(content)?;
        assert_eq!(jar.len(), 1);
        assert!(jar.iter().all(|c| c.http_only));
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        write!(
            temp,
            "{}",
            netscape(&[".springer.com\tTRUE\t/\tFALSE\t\tsid\tabc"])
        )?;
        let jar = CookieJar::load(temp.path())?;
        assert_eq!(jar.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = CookieJar::load(Path::new("/nonexistent/cookies.txt"));
        assert!(matches!(result, Err(SpringerError::Io(_))));
    }

    #[test]
    fn test_reqwest_jar_scopes_by_domain() -> Result<()> {
        let content = netscape(&[
            ".springer.com\tTRUE\t/\tFALSE\t\tsid\tabc",
            "other.example\tFALSE\t/\tFALSE\t\tnope\tx",
        ]);
        let jar = CookieJar::parse_netscape(&content, NOW)?.to_reqwest_jar()?;

        let url = Url::parse("https://link.springer.com/book/123")?;
        let header = jar.cookies(&url).expect("cookies for springer");
        let header = header.to_str().expect("ascii header");
        assert!(header.contains("sid=abc"));
        assert!(!header.contains("nope"));
        Ok(())
    }

    #[test]
    fn test_include_subdomains_flag_without_dot() -> Result<()> {
        let content = netscape(&[
            "springer.com\tTRUE\t/\tFALSE\t0\tsid\tabc",
            "springer.com\tFALSE\t/\tFALSE\t0\thost\tonly",
        ]);
        let jar = CookieJar::parse_netscape(&content, NOW)?;
        assert!(jar.iter().next().expect("flagged cookie").include_subdomains());

        let jar = jar.to_reqwest_jar()?;
        let url = Url::parse("https://link.springer.com/book/1")?;
        let header = jar.cookies(&url).expect("cookies for subdomain");
        let header = header.to_str().expect("ascii header");
        assert!(header.contains("sid=abc"));
        assert!(!header.contains("host=only"));
        Ok(())
    }

    #[test]
    fn test_json_domain_without_dot_is_host_only() -> Result<()> {
        let content = r#"[{"name": "sid", "value": "abc", "domain": "link.springer.com"}]"#;
        let jar = CookieJar::parse(content)?;
        assert!(!jar.iter().all(|c| c.include_subdomains()));

        let jar = jar.to_reqwest_jar()?;
        let other = Url::parse("https://rd.link.springer.com/")?;
        assert!(jar.cookies(&other).is_none());
        Ok(())
    }
}
