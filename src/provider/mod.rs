//! Metadata and artwork providers
//!
//! A scraper host talks to providers through [`TvShowMetadataProvider`] and
//! [`TvShowArtworkProvider`]. [`TheTvDbProvider`] implements both on top of a
//! [`TvdbApi`](crate::tvdb::TvdbApi).

mod mapping;
mod scoring;
mod thetvdb;

pub use thetvdb::TheTvDbProvider;

use crate::model::{
    MediaArtwork, MediaEpisode, MediaMetadata, MediaScrapeOptions, MediaSearchOptions,
    MediaSearchResult, MediaType,
};
use crate::tvdb::TvdbError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The options carry no usable identifier for this provider
    #[error("No valid TheTVDB id in the scrape options")]
    MissingId,

    /// Episode lookups need a season/episode number or an air date
    #[error("Neither an episode number nor an air date was given")]
    MissingEpisodeIdentifier,

    #[error("Media type {0} is not supported by this provider")]
    UnsupportedMediaType(MediaType),

    /// The requested show or episode does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Api(#[from] TvdbError),
}

/// Static description of a provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

/// Looks up TV show and episode metadata
pub trait TvShowMetadataProvider {
    fn provider_info(&self) -> &ProviderInfo;

    /// Searches shows matching the options, best match first
    fn search(&self, options: &MediaSearchOptions)
    -> Result<Vec<MediaSearchResult>, ProviderError>;

    /// Fetches metadata of a show or of one of its episodes
    fn get_metadata(&self, options: &MediaScrapeOptions) -> Result<MediaMetadata, ProviderError>;

    /// Lists all episodes of a show
    fn get_episode_list(
        &self,
        options: &MediaScrapeOptions,
    ) -> Result<Vec<MediaEpisode>, ProviderError>;
}

/// Looks up artwork of a TV show
pub trait TvShowArtworkProvider {
    fn get_artwork(&self, options: &MediaScrapeOptions) -> Result<Vec<MediaArtwork>, ProviderError>;
}
