//! Legacy XML document helper
//!
//! Fetches XML pages with [`fetch_valid_page`], parses them into an
//! [`XmlDocument`] and optionally keeps validated pages in an on-disk cache.

mod document;
mod fetch;

pub use document::{XmlDocument, XmlElement, XmlError, XmlNode};
pub use fetch::{HttpPageSource, Page, PageError, PageSource, RetryPolicy, fetch_valid_page};

use crate::cache::{CacheError, CacheStorage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Element every valid page must carry with a non-empty value
pub const IDENTIFIER_TAG: &str = "id";

/// Coarse classification of a [`DocumentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    MappingFailed,
    UnknownCause,
}

/// Errors of the document helper
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// The page was fetched but is not well-formed XML
    #[error("Failed to map document from {url}: {source}")]
    MappingFailed { url: String, source: XmlError },

    /// Every attempt returned an incomplete page
    #[error("No complete page from {url} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        status: Option<u16>,
        content: String,
    },

    #[error("Fetching {url} failed: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        content: String,
        message: String,
    },
}

impl DocumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            DocumentError::MappingFailed { .. } => ErrorKind::MappingFailed,
            DocumentError::RetriesExhausted { .. } | DocumentError::Transport { .. } => {
                ErrorKind::UnknownCause
            }
        }
    }

    /// Last HTTP status seen before the failure
    pub fn status(&self) -> Option<u16> {
        match self {
            DocumentError::RetriesExhausted { status, .. }
            | DocumentError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Content received before the failure
    pub fn content(&self) -> Option<&str> {
        match self {
            DocumentError::RetriesExhausted { content, .. }
            | DocumentError::Transport { content, .. } => Some(content),
            _ => None,
        }
    }
}

/// A validated page as kept in the page cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPage {
    pub url: String,
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches, validates and parses XML documents
pub struct DocumentFetcher<S: PageSource> {
    source: S,
    policy: RetryPolicy,
    cache: Option<CacheStorage<CachedPage>>,
}

impl<S: PageSource> DocumentFetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            cache: None,
        }
    }

    /// Keeps validated pages in the cache named `pages` for `ttl`
    pub fn with_page_cache(mut self, ttl: Duration) -> Result<Self, CacheError> {
        self.cache = Some(CacheStorage::open("pages", ttl)?);
        Ok(self)
    }

    #[cfg(test)]
    fn with_cache_storage(mut self, cache: CacheStorage<CachedPage>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the parsed document at `url`
    ///
    /// A fresh cached page is used when available. Otherwise the page is
    /// fetched with retries, parsed and stored in the cache. Cache failures
    /// never fail the fetch.
    pub fn fetch_document(&self, url: &str) -> Result<XmlDocument, DocumentError> {
        if let Some(page) = self.cached(url) {
            debug!(url, fetched_at = %page.fetched_at, "using cached page");
            return parse(url, &page.content);
        }

        let content = fetch_valid_page(&self.source, url, IDENTIFIER_TAG, &self.policy)?;
        let document = parse(url, &content)?;

        if let Some(cache) = &self.cache {
            let page = CachedPage {
                url: url.to_string(),
                content,
                fetched_at: Utc::now(),
            };
            if let Err(e) = cache.store(url, &page) {
                warn!(url, error = %e, "failed to cache page");
            }
        }

        Ok(document)
    }

    fn cached(&self, url: &str) -> Option<CachedPage> {
        let cache = self.cache.as_ref()?;
        match cache.load(url) {
            Ok(Some(page)) if page.url == url => Some(page),
            Ok(_) => None,
            Err(e) => {
                warn!(url, cache_dir = %cache.cache_dir().display(), error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }
}

fn parse(url: &str, content: &str) -> Result<XmlDocument, DocumentError> {
    XmlDocument::parse(content).map_err(|e| DocumentError::MappingFailed {
        url: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::fetch::tests::{ScriptedSource, page};
    use super::*;

    fn no_delay() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_fetch_document_parses_valid_page() {
        let source = ScriptedSource::new(vec![
            page(200, "<Data><id></id></Data>"),
            page(200, "<Data><Series><id>1</id><SeriesName>Monk</SeriesName></Series></Data>"),
        ]);
        let fetcher = DocumentFetcher::new(source, no_delay());

        let doc = fetcher.fetch_document("http://x/series/1.xml").unwrap();
        assert_eq!(doc.value_from_element("SeriesName"), "Monk");
    }

    #[test]
    fn test_malformed_page_is_mapping_failure() {
        let source = ScriptedSource::new(vec![page(200, "<Data><id>1</id>")]);
        let fetcher = DocumentFetcher::new(source, no_delay());

        let err = fetcher.fetch_document("http://x/series/1.xml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MappingFailed);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_cached_page_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let url = "http://x/series/1.xml";

        let first = DocumentFetcher::new(
            ScriptedSource::new(vec![page(200, "<Data><id>1</id></Data>")]),
            no_delay(),
        )
        .with_cache_storage(CacheStorage::open_in(dir.path(), Duration::from_secs(60)).unwrap());
        first.fetch_document(url).unwrap();
        assert_eq!(first.source.calls.get(), 1);

        let second = DocumentFetcher::new(ScriptedSource::new(vec![]), no_delay())
            .with_cache_storage(CacheStorage::open_in(dir.path(), Duration::from_secs(60)).unwrap());
        let doc = second.fetch_document(url).unwrap();
        assert_eq!(doc.value_from_element("id"), "1");
        assert_eq!(second.source.calls.get(), 0);
    }

    #[test]
    fn test_error_kinds() {
        let err = DocumentError::Transport {
            url: "u".to_string(),
            status: Some(500),
            content: "partial".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnknownCause);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.content(), Some("partial"));

        let err = DocumentError::InvalidUrl {
            url: "u".to_string(),
            message: "relative URL without a base".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
        assert_eq!(err.content(), None);
    }
}
