//! TheTVDB v2 API response types for deserialization.
//!
//! These structures mirror the JSON returned by https://api.thetvdb.com. The
//! API is loose with numeric fields (numbers, strings or null depending on the
//! record), so those are kept as [`LooseNumber`] and interpreted by the mapper.
use serde::{Deserialize, Serialize};

/// Envelope most endpoints wrap their payload in.
#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse<T> {
    pub data: T,
}

/// Response of `POST /login` and `GET /refresh_token`.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

/// A number that may arrive as integer, float or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Integer value, truncating fractions; `None` if text does not parse.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Integer(value) => Some(*value),
            LooseNumber::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
            }
        }
    }

    /// Floating point value; `None` if text does not parse or is not finite.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Integer(value) => *value as f64,
            LooseNumber::Float(value) => *value,
            LooseNumber::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// A language TheTVDB serves content in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: u64,
    pub abbreviation: String,
    pub name: String,
    #[serde(default)]
    pub english_name: Option<String>,
}

/// A series record, as returned by search and by `GET /series/{id}`.
///
/// Search results only fill a subset of the fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: u64,
    #[serde(default)]
    pub series_name: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    /// Relative path of the series banner
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub first_aired: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    /// Runtime in minutes, usually delivered as text
    #[serde(default)]
    pub runtime: Option<LooseNumber>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    #[serde(default)]
    pub overview: Option<String>,
    /// Content rating label such as "TV-PG"
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub site_rating: Option<LooseNumber>,
    #[serde(default)]
    pub site_rating_count: Option<LooseNumber>,
}

/// A cast entry of `GET /series/{id}/actors`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    /// Relative path of the actor image
    #[serde(default)]
    pub image: Option<String>,
}

/// An episode as listed by the episode endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: u64,
    #[serde(default)]
    pub aired_season: Option<LooseNumber>,
    #[serde(default)]
    pub aired_episode_number: Option<LooseNumber>,
    #[serde(default)]
    pub dvd_season: Option<LooseNumber>,
    #[serde(default)]
    pub dvd_episode_number: Option<LooseNumber>,
    #[serde(default)]
    pub absolute_number: Option<LooseNumber>,
    #[serde(default)]
    pub episode_name: Option<String>,
    #[serde(default)]
    pub first_aired: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

/// The full record of `GET /episodes/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullEpisode {
    #[serde(flatten)]
    pub episode: Episode,
    #[serde(default)]
    pub directors: Option<Vec<String>>,
    #[serde(default)]
    pub writers: Option<Vec<String>>,
    #[serde(default)]
    pub guest_stars: Option<Vec<String>>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    /// Relative path of the episode thumbnail
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub site_rating: Option<LooseNumber>,
    #[serde(default)]
    pub site_rating_count: Option<LooseNumber>,
}

/// Pagination links of a paged response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub first: Option<u32>,
    #[serde(default)]
    pub last: Option<u32>,
    #[serde(default)]
    pub next: Option<u32>,
    #[serde(default)]
    pub prev: Option<u32>,
}

/// One page of `GET /series/{id}/episodes`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EpisodesPage {
    #[serde(default)]
    pub data: Vec<Episode>,
    #[serde(default)]
    pub links: Option<Links>,
}

/// An artwork category available for a series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageQueryParam {
    pub key_type: String,
    #[serde(default)]
    pub language_id: Option<String>,
    #[serde(default)]
    pub resolution: Option<Vec<String>>,
    #[serde(default)]
    pub sub_key: Option<Vec<String>>,
}

/// Community rating of an image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RatingsInfo {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub count: u32,
}

/// A single image of `GET /series/{id}/images/query`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageQueryResult {
    pub id: u64,
    pub key_type: String,
    /// Season number for season artwork
    #[serde(default)]
    pub sub_key: Option<String>,
    pub file_name: String,
    /// Pixel dimensions as `WIDTHxHEIGHT`
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub ratings_info: Option<RatingsInfo>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}
