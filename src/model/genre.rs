use serde::{Deserialize, Serialize};
use std::fmt;

/// Genres known to the host, plus free-form genres it does not know about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaGenre {
    Action,
    Adventure,
    Animal,
    Animation,
    Biography,
    Comedy,
    Crime,
    Disaster,
    Documentary,
    Drama,
    Eastern,
    Erotic,
    Family,
    FanFilm,
    Fantasy,
    FilmNoir,
    Foreign,
    GameShow,
    History,
    Holiday,
    Horror,
    Indie,
    Music,
    Musical,
    Mystery,
    NeoNoir,
    News,
    RealityTv,
    RoadMovie,
    Romance,
    ScienceFiction,
    Series,
    Short,
    SilentMovie,
    Sport,
    SportingEvent,
    SportsFilm,
    Suspense,
    TalkShow,
    TvMovie,
    Thriller,
    War,
    Western,
    /// A genre the host has no entry for, kept by name
    Other(String),
}

const KNOWN: &[MediaGenre] = &[
    MediaGenre::Action,
    MediaGenre::Adventure,
    MediaGenre::Animal,
    MediaGenre::Animation,
    MediaGenre::Biography,
    MediaGenre::Comedy,
    MediaGenre::Crime,
    MediaGenre::Disaster,
    MediaGenre::Documentary,
    MediaGenre::Drama,
    MediaGenre::Eastern,
    MediaGenre::Erotic,
    MediaGenre::Family,
    MediaGenre::FanFilm,
    MediaGenre::Fantasy,
    MediaGenre::FilmNoir,
    MediaGenre::Foreign,
    MediaGenre::GameShow,
    MediaGenre::History,
    MediaGenre::Holiday,
    MediaGenre::Horror,
    MediaGenre::Indie,
    MediaGenre::Music,
    MediaGenre::Musical,
    MediaGenre::Mystery,
    MediaGenre::NeoNoir,
    MediaGenre::News,
    MediaGenre::RealityTv,
    MediaGenre::RoadMovie,
    MediaGenre::Romance,
    MediaGenre::ScienceFiction,
    MediaGenre::Series,
    MediaGenre::Short,
    MediaGenre::SilentMovie,
    MediaGenre::Sport,
    MediaGenre::SportingEvent,
    MediaGenre::SportsFilm,
    MediaGenre::Suspense,
    MediaGenre::TalkShow,
    MediaGenre::TvMovie,
    MediaGenre::Thriller,
    MediaGenre::War,
    MediaGenre::Western,
];

impl MediaGenre {
    /// Display name of the genre
    pub fn name(&self) -> &str {
        match self {
            MediaGenre::Action => "Action",
            MediaGenre::Adventure => "Adventure",
            MediaGenre::Animal => "Animal",
            MediaGenre::Animation => "Animation",
            MediaGenre::Biography => "Biography",
            MediaGenre::Comedy => "Comedy",
            MediaGenre::Crime => "Crime",
            MediaGenre::Disaster => "Disaster",
            MediaGenre::Documentary => "Documentary",
            MediaGenre::Drama => "Drama",
            MediaGenre::Eastern => "Eastern",
            MediaGenre::Erotic => "Erotic",
            MediaGenre::Family => "Family",
            MediaGenre::FanFilm => "Fan Film",
            MediaGenre::Fantasy => "Fantasy",
            MediaGenre::FilmNoir => "Film Noir",
            MediaGenre::Foreign => "Foreign",
            MediaGenre::GameShow => "Game Show",
            MediaGenre::History => "History",
            MediaGenre::Holiday => "Holiday",
            MediaGenre::Horror => "Horror",
            MediaGenre::Indie => "Indie",
            MediaGenre::Music => "Music",
            MediaGenre::Musical => "Musical",
            MediaGenre::Mystery => "Mystery",
            MediaGenre::NeoNoir => "Neo Noir",
            MediaGenre::News => "News",
            MediaGenre::RealityTv => "Reality TV",
            MediaGenre::RoadMovie => "Road Movie",
            MediaGenre::Romance => "Romance",
            MediaGenre::ScienceFiction => "Science Fiction",
            MediaGenre::Series => "Series",
            MediaGenre::Short => "Short",
            MediaGenre::SilentMovie => "Silent Movie",
            MediaGenre::Sport => "Sport",
            MediaGenre::SportingEvent => "Sporting Event",
            MediaGenre::SportsFilm => "Sports Film",
            MediaGenre::Suspense => "Suspense",
            MediaGenre::TalkShow => "Talk Show",
            MediaGenre::TvMovie => "TV Movie",
            MediaGenre::Thriller => "Thriller",
            MediaGenre::War => "War",
            MediaGenre::Western => "Western",
            MediaGenre::Other(name) => name,
        }
    }

    /// Generic lookup by name
    ///
    /// Matches display names case-insensitively, ignoring spaces, hyphens and
    /// underscores, so `"Science-Fiction"`, `"science_fiction"` and
    /// `"Science Fiction"` all resolve to the same genre. Anything unknown
    /// becomes [`MediaGenre::Other`].
    pub fn from_name(name: &str) -> MediaGenre {
        let wanted = normalize(name);
        KNOWN
            .iter()
            .find(|genre| normalize(genre.name()) == wanted)
            .cloned()
            .unwrap_or_else(|| MediaGenre::Other(name.trim().to_string()))
    }
}

impl fmt::Display for MediaGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
