//! TheTVDB API access
//!
//! The [`TvdbApi`] trait lists the remote operations the provider needs.
//! [`TvdbClient`] implements it against the live v2 REST API; tests substitute
//! an in-memory implementation.

mod client;
mod types;

pub use client::TvdbClient;
pub use types::{
    Actor, Episode, EpisodesPage, FullEpisode, ImageQueryParam, ImageQueryResult, Language, Links,
    LooseNumber, RatingsInfo, Series,
};

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while talking to TheTVDB.
#[derive(Debug, Error)]
pub enum TvdbError {
    /// No API key was configured
    #[error("No TheTVDB API key configured")]
    MissingApiKey,

    /// The API rejected our credentials
    #[error("Authentication with TheTVDB failed: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request could not be sent or the connection broke
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    /// The API answered with an unexpected status code
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// The response body could not be decoded
    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },
}

impl TvdbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TvdbError::NotFound(_))
    }
}

/// Filter for `GET /series/{id}/episodes/query`.
///
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeQuery {
    pub aired_season: Option<u32>,
    pub aired_episode: Option<u32>,
    pub dvd_season: Option<u32>,
    pub dvd_episode: Option<u32>,
    pub first_aired: Option<NaiveDate>,
}

impl EpisodeQuery {
    pub fn aired(season: u32, episode: u32) -> Self {
        Self {
            aired_season: Some(season),
            aired_episode: Some(episode),
            ..Default::default()
        }
    }

    pub fn dvd(season: u32, episode: u32) -> Self {
        Self {
            dvd_season: Some(season),
            dvd_episode: Some(episode),
            ..Default::default()
        }
    }

    pub fn first_aired(date: NaiveDate) -> Self {
        Self {
            first_aired: Some(date),
            ..Default::default()
        }
    }

    /// Query string parameters in the form the API expects.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(season) = self.aired_season {
            params.push(("airedSeason", season.to_string()));
        }
        if let Some(episode) = self.aired_episode {
            params.push(("airedEpisode", episode.to_string()));
        }
        if let Some(season) = self.dvd_season {
            params.push(("dvdSeason", season.to_string()));
        }
        if let Some(episode) = self.dvd_episode {
            params.push(("dvdEpisode", episode.to_string()));
        }
        if let Some(date) = self.first_aired {
            params.push(("firstAired", date.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// Remote operations against TheTVDB.
///
/// Implementations are blocking; callers serialize access themselves.
pub trait TvdbApi {
    /// Languages content is available in.
    fn languages(&self) -> Result<Vec<Language>, TvdbError>;

    /// Searches series by name.
    fn search_series(&self, name: &str, language: &str) -> Result<Vec<Series>, TvdbError>;

    /// Fetches a series record.
    fn series(&self, id: u64, language: &str) -> Result<Series, TvdbError>;

    /// Fetches the cast of a series.
    fn series_actors(&self, id: u64) -> Result<Vec<Actor>, TvdbError>;

    /// Fetches one page (100 entries) of a series' episodes.
    fn series_episodes(&self, id: u64, page: u32, language: &str)
    -> Result<EpisodesPage, TvdbError>;

    /// Queries the first page of a series' episodes matching `query`.
    fn episodes_query(
        &self,
        id: u64,
        query: &EpisodeQuery,
        language: &str,
    ) -> Result<Vec<Episode>, TvdbError>;

    /// Fetches the full record of a single episode.
    fn episode(&self, id: u64, language: &str) -> Result<FullEpisode, TvdbError>;

    /// Lists the artwork categories available for a series.
    fn image_query_params(&self, id: u64) -> Result<Vec<ImageQueryParam>, TvdbError>;

    /// Lists a series' artwork of one category (`fanart`, `poster`, ...).
    fn images_query(&self, id: u64, key_type: &str) -> Result<Vec<ImageQueryResult>, TvdbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_query_params_only_contain_set_fields() {
        assert_eq!(
            EpisodeQuery::aired(1, 2).params(),
            vec![
                ("airedSeason", "1".to_string()),
                ("airedEpisode", "2".to_string())
            ]
        );
        assert_eq!(
            EpisodeQuery::dvd(3, 4).params(),
            vec![("dvdSeason", "3".to_string()), ("dvdEpisode", "4".to_string())]
        );

        let date = NaiveDate::from_ymd_opt(2006, 7, 14).unwrap();
        assert_eq!(
            EpisodeQuery::first_aired(date).params(),
            vec![("firstAired", "2006-07-14".to_string())]
        );
        assert!(EpisodeQuery::default().params().is_empty());
    }
}
