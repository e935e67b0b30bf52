//! tvdb_scraper - TheTVDB metadata and artwork provider
//!
//! This library looks up TV shows, episodes and artwork on TheTVDB and
//! translates the results into a media scraper's metadata model. It also
//! carries a small helper for fetching and editing legacy XML documents.

mod cache;
pub mod config;
pub mod model;
pub mod provider;
pub mod tvdb;
pub mod xml_document;

#[cfg(test)]
mod test_server;

pub use cache::CacheError;
pub use config::{ConfigError, ScraperConfig};
pub use provider::{
    ProviderError, ProviderInfo, TheTvDbProvider, TvShowArtworkProvider, TvShowMetadataProvider,
};
pub use tvdb::{TvdbApi, TvdbClient, TvdbError};
pub use xml_document::{DocumentError, DocumentFetcher, HttpPageSource};

use thiserror::Error;
use tracing::info;

/// Top-level error type for the scraper
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("TheTVDB error: {0}")]
    Tvdb(#[from] TvdbError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Connects to TheTVDB and wraps the client in a provider
///
/// # Arguments
///
/// * `config` - Settings carrying at least the API key
///
/// # Returns
///
/// A provider ready for metadata and artwork lookups, or a ScraperError if
/// the login or language lookup fails
pub fn connect_provider(config: &ScraperConfig) -> Result<TheTvDbProvider<TvdbClient>, ScraperError> {
    let client = TvdbClient::connect(config)?;
    Ok(TheTvDbProvider::new(client, config.artwork_base_url.clone()))
}

/// Builds an XML document fetcher from the retry and cache settings
pub fn document_fetcher(
    config: &ScraperConfig,
) -> Result<DocumentFetcher<HttpPageSource>, ScraperError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.request_timeout())
        .build()?;

    let fetcher = DocumentFetcher::new(HttpPageSource::new(client), config.retry.policy());
    match config.page_cache_ttl() {
        Some(ttl) => {
            info!(ttl_hours = config.page_cache_ttl_hours, "page cache enabled");
            Ok(fetcher.with_page_cache(ttl)?)
        }
        None => Ok(fetcher),
    }
}
