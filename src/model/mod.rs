//! Host media-metadata model
//!
//! These are the records a scraper host consumes: search results, show and
//! episode metadata, episode listings and artwork. Providers only fill them in;
//! no invariants are enforced beyond what the types express.

mod certification;
mod genre;

pub use certification::Certification;
pub use genre::MediaGenre;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Id key used for IMDb identifiers in [`MediaMetadata::ids`]
pub const IMDB: &str = "imdb";

/// The kind of media an operation is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    TvShow,
    TvEpisode,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaType::Movie => "movie",
            MediaType::TvShow => "tv show",
            MediaType::TvEpisode => "tv episode",
        };
        f.write_str(name)
    }
}

/// Artwork categories, also used as a filter in scrape options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaArtworkType {
    Background,
    Banner,
    Poster,
    Season,
    Thumb,
    /// Filter value matching every category
    All,
}

/// Size tiers for posters, ranked by their order value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    Large,
    Big,
    Medium,
    Small,
}

impl PosterSize {
    pub fn order(self) -> u32 {
        match self {
            PosterSize::Large => 8,
            PosterSize::Big => 4,
            PosterSize::Medium => 2,
            PosterSize::Small => 1,
        }
    }
}

/// Size tiers for fanart and other wide artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanartSize {
    Large,
    Medium,
    Small,
}

impl FanartSize {
    pub fn order(self) -> u32 {
        match self {
            FanartSize::Large => 8,
            FanartSize::Medium => 2,
            FanartSize::Small => 1,
        }
    }
}

/// Role of a person in a cast list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    Actor,
    Director,
    Writer,
}

/// Ordering scheme an episode number refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOrder {
    #[default]
    Aired,
    Dvd,
}

/// Season/episode pair identifying an episode within a show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeNumber {
    pub season: u32,
    pub episode: u32,
    pub order: EpisodeOrder,
}

/// Options for a search call
#[derive(Debug, Clone)]
pub struct MediaSearchOptions {
    pub media_type: MediaType,
    pub query: String,
    /// ISO-639-1 language code, e.g. `"en"`
    pub language: String,
    /// Year hint; `None` or 0 disables the year penalty
    pub year: Option<i32>,
}

impl MediaSearchOptions {
    pub fn new(media_type: MediaType, query: impl Into<String>) -> Self {
        Self {
            media_type,
            query: query.into(),
            language: "en".to_string(),
            year: None,
        }
    }
}

/// Options for metadata, artwork and episode-list calls
#[derive(Debug, Clone)]
pub struct MediaScrapeOptions {
    pub media_type: MediaType,
    /// Known identifiers keyed by provider id
    pub ids: BTreeMap<String, String>,
    /// A search result picked earlier, whose id takes precedence
    pub result: Option<MediaSearchResult>,
    pub language: String,
    pub artwork_type: MediaArtworkType,
    /// Episode to look up (episode metadata only)
    pub episode: Option<EpisodeNumber>,
    /// Air date used when the episode number lookup finds nothing
    pub release_date: Option<NaiveDate>,
}

impl MediaScrapeOptions {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            ids: BTreeMap::new(),
            result: None,
            language: "en".to_string(),
            artwork_type: MediaArtworkType::All,
            episode: None,
            release_date: None,
        }
    }

    pub fn set_id(&mut self, provider_id: impl Into<String>, id: impl Into<String>) {
        self.ids.insert(provider_id.into(), id.into());
    }

    pub fn id(&self, provider_id: &str) -> Option<&str> {
        self.ids.get(provider_id).map(String::as_str)
    }
}

/// A single hit from a search call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSearchResult {
    pub provider_id: String,
    pub media_type: MediaType,
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub score: f32,
}

/// A person credited on a show or episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaCastMember {
    pub cast_type: CastType,
    pub name: String,
    pub character: Option<String>,
    pub image_url: Option<String>,
}

impl MediaCastMember {
    pub fn new(cast_type: CastType, name: impl Into<String>) -> Self {
        Self {
            cast_type,
            name: name.into(),
            character: None,
            image_url: None,
        }
    }
}

/// One concrete rendition of an artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// An artwork entry with its renditions and size ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaArtwork {
    pub provider_id: String,
    pub artwork_type: MediaArtworkType,
    pub default_url: String,
    pub preview_url: String,
    pub season: Option<u32>,
    pub image_sizes: Vec<ImageSize>,
    /// Order value of the size tier, see [`PosterSize`] and [`FanartSize`]
    pub size_order: u32,
}

impl MediaArtwork {
    pub fn new(provider_id: impl Into<String>, artwork_type: MediaArtworkType) -> Self {
        Self {
            provider_id: provider_id.into(),
            artwork_type,
            default_url: String::new(),
            preview_url: String::new(),
            season: None,
            image_sizes: Vec::new(),
            size_order: 0,
        }
    }

    pub fn add_image_size(&mut self, width: u32, height: u32, url: impl Into<String>) {
        self.image_sizes.push(ImageSize {
            width,
            height,
            url: url.into(),
        });
    }
}

/// Metadata of a show or an episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub provider_id: String,
    /// Identifiers keyed by provider name (`"tvdb"`, `"imdb"`, ...)
    pub ids: BTreeMap<String, String>,
    pub title: String,
    pub plot: String,
    pub year: Option<i32>,
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes, 0 when unknown
    pub runtime: u32,
    pub rating: f32,
    pub vote_count: u32,
    pub status: Option<String>,
    pub production_companies: Vec<String>,
    pub certifications: Vec<Certification>,
    pub genres: Vec<MediaGenre>,
    pub cast: Vec<MediaCastMember>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
    pub dvd_season_number: Option<u32>,
    pub dvd_episode_number: Option<u32>,
    pub absolute_number: Option<u32>,
    pub media_art: Vec<MediaArtwork>,
}

impl MediaMetadata {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            ..Default::default()
        }
    }

    pub fn set_id(&mut self, provider_id: impl Into<String>, id: impl ToString) {
        self.ids.insert(provider_id.into(), id.to_string());
    }

    pub fn id(&self, provider_id: &str) -> Option<&str> {
        self.ids.get(provider_id).map(String::as_str)
    }

    pub fn cast_members(&self, cast_type: CastType) -> impl Iterator<Item = &MediaCastMember> {
        self.cast.iter().filter(move |m| m.cast_type == cast_type)
    }

    pub fn media_art(&self, artwork_type: MediaArtworkType) -> impl Iterator<Item = &MediaArtwork> {
        self.media_art
            .iter()
            .filter(move |a| a.artwork_type == artwork_type)
    }
}

/// An entry of a show's episode listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaEpisode {
    pub provider_id: String,
    pub ids: BTreeMap<String, String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub dvd_season: Option<u32>,
    pub dvd_episode: Option<u32>,
    pub title: String,
    pub plot: String,
    /// First-aired date exactly as delivered by the source
    pub first_aired: String,
}

impl MediaEpisode {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            ..Default::default()
        }
    }
}
