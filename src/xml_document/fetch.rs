//! Page fetching with validation and retry
//!
//! Legacy XML endpoints sometimes answer with a document whose identifier is
//! still empty. Such pages are fetched again after a delay that grows with
//! every attempt.

use super::DocumentError;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// A fetched page with the HTTP status it came with
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

/// Failures of a single fetch
#[derive(Debug, Clone, PartialEq)]
pub enum PageError {
    /// The URL cannot be turned into a request
    InvalidUrl(String),
    /// The request failed or returned a non-success status
    Transport {
        status: Option<u16>,
        message: String,
        /// Body of a non-success response, if it could be read
        body: Option<String>,
    },
}

/// Something that can fetch a page by URL
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<Page, PageError>;
}

/// Fetches pages over HTTP
pub struct HttpPageSource {
    client: reqwest::blocking::Client,
}

impl HttpPageSource {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new(reqwest::blocking::Client::new())
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<Page, PageError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| PageError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| PageError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
                body: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Transport {
                status: Some(status.as_u16()),
                message: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
                body: response.text().ok(),
            });
        }

        let body = response.text().map_err(|e| PageError::Transport {
            status: Some(status.as_u16()),
            message: format!("Failed to decode response body: {e}"),
            body: None,
        })?;

        Ok(Page {
            status: status.as_u16(),
            body,
        })
    }
}

/// How often and how patiently a page is fetched again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Attempt `n` is followed by a pause of `n * base_delay`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Checks whether `content` carries a non-empty `<tag>` element
fn has_identifier(content: &str, tag: &str) -> bool {
    content.contains(&format!("<{tag}>")) && !content.contains(&format!("<{tag}></{tag}>"))
}

/// Fetches `url` until the page carries a non-empty `<tag>` element
///
/// Incomplete pages (including blank ones) are fetched again up to
/// `policy.max_attempts` times in total, sleeping `attempt * base_delay`
/// in between.
///
/// # Errors
///
/// * [`DocumentError::InvalidUrl`] if the URL is unusable
/// * [`DocumentError::Transport`] on the first failed request, carrying the
///   content and status seen so far
/// * [`DocumentError::RetriesExhausted`] if no attempt produced a complete page
pub fn fetch_valid_page<S: PageSource + ?Sized>(
    source: &S,
    url: &str,
    tag: &str,
    policy: &RetryPolicy,
) -> Result<String, DocumentError> {
    let mut content = String::new();
    let mut status = None;
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match source.fetch(url) {
            Ok(page) => {
                status = Some(page.status);
                content = page.body;
            }
            Err(PageError::InvalidUrl(message)) => {
                return Err(DocumentError::InvalidUrl {
                    url: url.to_string(),
                    message,
                });
            }
            Err(PageError::Transport {
                status: failed_status,
                message,
                body,
            }) => {
                return Err(DocumentError::Transport {
                    url: url.to_string(),
                    status: failed_status.or(status),
                    content: body.unwrap_or(content),
                    message,
                });
            }
        }

        if has_identifier(&content, tag) {
            debug!(url, attempt, "fetched complete page");
            return Ok(content);
        }

        if attempt < attempts {
            let delay = policy.delay_after(attempt);
            debug!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "page has no <{tag}> yet, retrying"
            );
            thread::sleep(delay);
        }
    }

    Err(DocumentError::RetriesExhausted {
        url: url.to_string(),
        attempts,
        status,
        content,
    })
}
