//! Field conversions from TheTVDB records to the media model
//!
//! Everything here is lenient: values that do not parse are dropped or fall
//! back to zero instead of failing the surrounding lookup.

use crate::model::{FanartSize, MediaGenre, PosterSize};
use crate::tvdb::LooseNumber;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static RESOLUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{3,4})x([0-9]{3,4})$").expect("resolution regex is valid")
});

/// TheTVDB genre names that do not map one-to-one onto [`MediaGenre`]
static TVDB_GENRES: &[(&str, MediaGenre)] = &[
    ("Action", MediaGenre::Action),
    ("Adventure", MediaGenre::Adventure),
    ("Animation", MediaGenre::Animation),
    ("Children", MediaGenre::Family),
    ("Comedy", MediaGenre::Comedy),
    ("Crime", MediaGenre::Crime),
    ("Documentary", MediaGenre::Documentary),
    ("Drama", MediaGenre::Drama),
    ("Family", MediaGenre::Family),
    ("Fantasy", MediaGenre::Fantasy),
    ("Food", MediaGenre::Documentary),
    ("Game Show", MediaGenre::GameShow),
    ("Home and Garden", MediaGenre::Documentary),
    ("Horror", MediaGenre::Horror),
    ("Mini-Series", MediaGenre::Series),
    ("News", MediaGenre::News),
    ("Reality", MediaGenre::RealityTv),
    ("Science-Fiction", MediaGenre::ScienceFiction),
    ("Soap", MediaGenre::Series),
    ("Special Interest", MediaGenre::Indie),
    ("Sport", MediaGenre::Sport),
    ("Suspense", MediaGenre::Suspense),
    ("Talk Show", MediaGenre::TalkShow),
    ("Thriller", MediaGenre::Thriller),
    ("Travel", MediaGenre::Holiday),
    ("Western", MediaGenre::Western),
];

/// Maps a TheTVDB genre name onto the model's genres
///
/// Names missing from the table go through [`MediaGenre::from_name`]. An
/// empty name yields `None`.
pub(crate) fn genre(name: &str) -> Option<MediaGenre> {
    if name.is_empty() {
        return None;
    }
    let mapped = TVDB_GENRES
        .iter()
        .find(|(tvdb_name, _)| *tvdb_name == name)
        .map(|(_, genre)| genre.clone());
    Some(mapped.unwrap_or_else(|| MediaGenre::from_name(name)))
}

pub(crate) fn poster_size(width: u32) -> PosterSize {
    match width {
        1000.. => PosterSize::Large,
        500..=999 => PosterSize::Big,
        342..=499 => PosterSize::Medium,
        _ => PosterSize::Small,
    }
}

pub(crate) fn fanart_size(width: u32) -> FanartSize {
    match width {
        1920.. => FanartSize::Large,
        1280..=1919 => FanartSize::Medium,
        _ => FanartSize::Small,
    }
}

/// Parses a `WIDTHxHEIGHT` resolution such as `1920x1080`
pub(crate) fn resolution(value: &str) -> Option<(u32, u32)> {
    let captures = RESOLUTION.captures(value.trim())?;
    let width = captures[1].parse().ok()?;
    let height = captures[2].parse().ok()?;
    Some((width, height))
}

/// Parses a count delivered as number or text; anything else is 0
pub(crate) fn count(value: Option<&LooseNumber>) -> u32 {
    value
        .and_then(LooseNumber::as_i64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Runtime in minutes, delivered as number or text; anything else is 0
pub(crate) fn runtime(value: Option<&LooseNumber>) -> u32 {
    count(value)
}

/// Community rating; unparseable or negative values become 0.0
pub(crate) fn rating(value: Option<&LooseNumber>) -> f32 {
    value
        .and_then(LooseNumber::as_f64)
        .filter(|v| *v >= 0.0)
        .map_or(0.0, |v| v as f32)
}

/// Parses the date formats TheTVDB uses, ignoring anything else
pub(crate) fn date(value: Option<&str>) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y"];

    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Year from the leading four characters of a first-aired string
pub(crate) fn year_prefix(first_aired: Option<&str>) -> Option<i32> {
    first_aired?.get(0..4)?.parse().ok()
}

pub(crate) fn year(date: Option<NaiveDate>) -> Option<i32> {
    date.map(|d| d.year())
}

/// Episode numbers start at 1; anything else is treated as unknown
pub(crate) fn episode_number(value: Option<&LooseNumber>) -> Option<u32> {
    value
        .and_then(LooseNumber::as_i64)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Season 0 holds specials, negative values are unknown
pub(crate) fn season_number(value: Option<&LooseNumber>) -> Option<u32> {
    value
        .and_then(LooseNumber::as_i64)
        .filter(|n| *n >= 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Removes a year that some series names carry, e.g. `Doctor Who (2005)`
pub(crate) fn strip_year_from_title(title: &str, year: i32) -> String {
    if year == 0 {
        return title.to_string();
    }
    let year = year.to_string();
    if !title.contains(&year) {
        return title.to_string();
    }
    title.replace(&year, "").replace("()", "").trim().to_string()
}

/// Prefixes a relative artwork path with the artwork base URL
pub(crate) fn artwork_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{base}{path}")
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
