/// TheTVDB metadata and artwork provider.
use super::mapping;
use super::scoring;
use super::{ProviderError, ProviderInfo, TvShowArtworkProvider, TvShowMetadataProvider};
use crate::model::{
    CastType, Certification, EpisodeOrder, FanartSize, IMDB, MediaArtwork, MediaArtworkType,
    MediaCastMember, MediaEpisode, MediaMetadata, MediaScrapeOptions, MediaSearchOptions,
    MediaSearchResult, MediaType,
};
use crate::tvdb::{
    Actor, Episode, EpisodeQuery, FullEpisode, ImageQueryResult, Series, TvdbApi, TvdbError,
};
use parking_lot::Mutex;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Id under which TheTVDB identifiers are stored
pub const PROVIDER_ID: &str = "tvdb";

static PROVIDER_INFO: ProviderInfo = ProviderInfo {
    id: PROVIDER_ID,
    name: "thetvdb.com",
    description: "TV show and episode metadata and artwork from TheTVDB, the open TV database",
    version: env!("CARGO_PKG_VERSION"),
};

/// Key type of artwork spanning all seasons, which is not offered
const SEASONWIDE: &str = "seasonwide";

/// Provider backed by TheTVDB.
///
/// All calls to the API go through one mutex, held for each group of calls
/// that make up a single operation.
pub struct TheTvDbProvider<A: TvdbApi> {
    api: Mutex<A>,
    artwork_base_url: String,
}

impl<A: TvdbApi> TheTvDbProvider<A> {
    /// Creates a provider
    ///
    /// # Arguments
    ///
    /// * `api` - The API client, e.g. a connected [`TvdbClient`](crate::tvdb::TvdbClient)
    /// * `artwork_base_url` - Prefix for the relative image paths the API returns
    pub fn new(api: A, artwork_base_url: impl Into<String>) -> Self {
        Self {
            api: Mutex::new(api),
            artwork_base_url: artwork_base_url.into(),
        }
    }

    /// Resolves the series id from a picked search result or the id map.
    fn resolve_id(options: &MediaScrapeOptions) -> Result<u64, ProviderError> {
        options
            .result
            .as_ref()
            .and_then(|result| parse_id(&result.id))
            .or_else(|| options.id(PROVIDER_ID).and_then(parse_id))
            .ok_or(ProviderError::MissingId)
    }

    fn artwork_url(&self, path: &str) -> String {
        mapping::artwork_url(&self.artwork_base_url, path)
    }

    fn search_result(&self, show: Series, options: &MediaSearchOptions) -> MediaSearchResult {
        let title = show.series_name.unwrap_or_default();
        let year = mapping::year_prefix(show.first_aired.as_deref());

        let mut score = scoring::calculate_score(&options.query, &title);
        if scoring::year_differs(options.year, year) {
            let penalty = scoring::year_penalty(options.year, year);
            debug!(id = show.id, penalty, "search result year differs, lowering score");
            score -= penalty;
        }

        MediaSearchResult {
            provider_id: PROVIDER_ID.to_string(),
            media_type: MediaType::TvShow,
            id: show.id.to_string(),
            poster_url: mapping::non_blank(show.banner.as_deref()).map(|b| self.artwork_url(b)),
            title,
            year,
            score,
        }
    }

    fn show_metadata(&self, options: &MediaScrapeOptions) -> Result<MediaMetadata, ProviderError> {
        let id = Self::resolve_id(options)?;
        debug!(id, language = %options.language, "fetching show metadata");

        let (show, actors) = {
            let api = self.api.lock();
            let show = api
                .series(id, &options.language)
                .map_err(|e| not_found(e, format!("series {id}")))?;
            let actors = api.series_actors(id).unwrap_or_else(|e| {
                warn!(id, error = %e, "failed to get actors");
                Vec::new()
            });
            (show, actors)
        };

        Ok(self.map_show(show, actors))
    }

    fn map_show(&self, show: Series, actors: Vec<Actor>) -> MediaMetadata {
        let mut md = MediaMetadata::new(PROVIDER_ID);
        md.set_id(PROVIDER_ID, show.id);
        if let Some(imdb_id) = mapping::non_blank(show.imdb_id.as_deref()) {
            md.set_id(IMDB, imdb_id);
        }

        md.title = show.series_name.unwrap_or_default();
        md.plot = show.overview.unwrap_or_default();
        md.runtime = mapping::runtime(show.runtime.as_ref());
        md.rating = mapping::rating(show.site_rating.as_ref());
        md.vote_count = mapping::count(show.site_rating_count.as_ref());
        md.release_date = mapping::date(show.first_aired.as_deref());
        md.year = mapping::year(md.release_date);

        if let Some(year) = md.year.filter(|y| md.title.contains(&y.to_string())) {
            debug!(id = show.id, year, "removing year from series name");
            md.title = mapping::strip_year_from_title(&md.title, year);
        }

        md.status = mapping::non_blank(show.status.as_deref()).map(str::to_string);
        if let Some(network) = mapping::non_blank(show.network.as_deref()) {
            md.production_companies.push(network.to_string());
        }

        md.cast = actors
            .into_iter()
            .map(|actor| {
                let mut member = MediaCastMember::new(CastType::Actor, actor.name.unwrap_or_default());
                member.character = mapping::non_blank(actor.role.as_deref()).map(str::to_string);
                member.image_url =
                    mapping::non_blank(actor.image.as_deref()).map(|image| self.artwork_url(image));
                member
            })
            .collect();

        if let Some(certification) = show.rating.as_deref().and_then(Certification::find) {
            md.certifications.push(certification);
        }

        md.genres = show
            .genre
            .iter()
            .flatten()
            .filter_map(|name| mapping::genre(name))
            .collect();

        md
    }

    fn episode_metadata(
        &self,
        options: &MediaScrapeOptions,
    ) -> Result<MediaMetadata, ProviderError> {
        let id = Self::resolve_id(options)?;
        if options.episode.is_none() && options.release_date.is_none() {
            return Err(ProviderError::MissingEpisodeIdentifier);
        }
        let language = options.language.as_str();

        let episode = {
            let api = self.api.lock();

            let mut matches = Vec::new();
            if let Some(number) = options.episode {
                let query = match number.order {
                    EpisodeOrder::Aired => EpisodeQuery::aired(number.season, number.episode),
                    EpisodeOrder::Dvd => EpisodeQuery::dvd(number.season, number.episode),
                };
                debug!(id, ?query, "looking up episode by number");
                matches = empty_if_not_found(api.episodes_query(id, &query, language))?;
            }

            if matches.is_empty() {
                if let Some(date) = options.release_date {
                    debug!(id, %date, "looking up episode by air date");
                    let query = EpisodeQuery::first_aired(date);
                    matches = empty_if_not_found(api.episodes_query(id, &query, language))?;
                }
            }

            let found = matches
                .first()
                .ok_or_else(|| ProviderError::NotFound(format!("episode of series {id}")))?;
            api.episode(found.id, language)
                .map_err(|e| not_found(e, format!("episode {}", found.id)))?
        };

        Ok(self.map_episode(episode, options.artwork_type))
    }

    fn map_episode(&self, episode: FullEpisode, artwork_type: MediaArtworkType) -> MediaMetadata {
        let FullEpisode {
            episode: base,
            directors,
            writers,
            guest_stars,
            imdb_id,
            filename,
            site_rating,
            site_rating_count,
        } = episode;

        let mut md = MediaMetadata::new(PROVIDER_ID);
        md.episode_number = mapping::episode_number(base.aired_episode_number.as_ref());
        md.season_number = mapping::season_number(base.aired_season.as_ref());
        md.dvd_episode_number = mapping::episode_number(base.dvd_episode_number.as_ref());
        md.dvd_season_number = mapping::season_number(base.dvd_season.as_ref());
        md.absolute_number = mapping::episode_number(base.absolute_number.as_ref());

        md.title = base.episode_name.unwrap_or_default();
        md.plot = base.overview.unwrap_or_default();
        md.rating = mapping::rating(site_rating.as_ref());
        md.vote_count = mapping::count(site_rating_count.as_ref());
        md.release_date = mapping::date(base.first_aired.as_deref());

        md.set_id(PROVIDER_ID, base.id);
        if let Some(imdb_id) = mapping::non_blank(imdb_id.as_deref()) {
            md.set_id(IMDB, imdb_id);
        }

        let credits = [
            (CastType::Director, directors),
            (CastType::Writer, writers),
            (CastType::Actor, guest_stars),
        ];
        for (cast_type, names) in credits {
            md.cast.extend(
                names
                    .into_iter()
                    .flatten()
                    .filter(|name| !name.trim().is_empty())
                    .map(|name| MediaCastMember::new(cast_type, name)),
            );
        }

        let wants_thumb = matches!(artwork_type, MediaArtworkType::All | MediaArtworkType::Thumb);
        if let Some(filename) = mapping::non_blank(filename.as_deref()).filter(|_| wants_thumb) {
            let mut thumb = MediaArtwork::new(PROVIDER_ID, MediaArtworkType::Thumb);
            thumb.default_url = self.artwork_url(filename);
            thumb.preview_url = thumb.default_url.clone();
            md.media_art.push(thumb);
        }

        md
    }

    fn map_artwork(&self, image: ImageQueryResult) -> Option<MediaArtwork> {
        let artwork_type = artwork_type_for(&image.key_type)?;
        let mut artwork = MediaArtwork::new(PROVIDER_ID, artwork_type);
        artwork.default_url = self.artwork_url(&image.file_name);

        if artwork_type == MediaArtworkType::Season {
            let sub_key = image.sub_key.as_deref().unwrap_or_default();
            match sub_key.trim().parse() {
                Ok(season) => artwork.season = Some(season),
                Err(_) => warn!(id = image.id, sub_key, "could not parse season"),
            }
        }

        if let Some(value) = mapping::non_blank(image.resolution.as_deref()) {
            match mapping::resolution(value) {
                Some((width, height)) => {
                    artwork.add_image_size(width, height, artwork.default_url.clone());
                    match artwork_type {
                        MediaArtworkType::Poster => {
                            artwork.size_order = mapping::poster_size(width).order()
                        }
                        MediaArtworkType::Background => {
                            artwork.size_order = mapping::fanart_size(width).order()
                        }
                        _ => {}
                    }
                }
                None => debug!(id = image.id, resolution = value, "could not extract artwork size"),
            }
        }

        // season posters and banners come without a resolution
        match artwork_type {
            MediaArtworkType::Season => artwork.size_order = FanartSize::Large.order(),
            MediaArtworkType::Banner => artwork.size_order = FanartSize::Medium.order(),
            _ => {}
        }

        artwork.preview_url = match mapping::non_blank(image.thumbnail.as_deref()) {
            Some(thumbnail) => self.artwork_url(thumbnail),
            None => artwork.default_url.clone(),
        };

        Some(artwork)
    }

    fn media_episode(episode: Episode) -> MediaEpisode {
        let mut media_episode = MediaEpisode::new(PROVIDER_ID);
        media_episode
            .ids
            .insert(PROVIDER_ID.to_string(), episode.id.to_string());
        media_episode.episode = mapping::episode_number(episode.aired_episode_number.as_ref());
        media_episode.season = mapping::season_number(episode.aired_season.as_ref());
        media_episode.dvd_episode = mapping::episode_number(episode.dvd_episode_number.as_ref());
        media_episode.dvd_season = mapping::season_number(episode.dvd_season.as_ref());
        media_episode.title = episode.episode_name.unwrap_or_default();
        media_episode.plot = episode.overview.unwrap_or_default();
        media_episode.first_aired = episode.first_aired.unwrap_or_default();
        media_episode
    }
}

impl<A: TvdbApi> TvShowMetadataProvider for TheTvDbProvider<A> {
    fn provider_info(&self) -> &ProviderInfo {
        &PROVIDER_INFO
    }

    fn search(
        &self,
        options: &MediaSearchOptions,
    ) -> Result<Vec<MediaSearchResult>, ProviderError> {
        if options.media_type != MediaType::TvShow {
            return Err(ProviderError::UnsupportedMediaType(options.media_type));
        }

        let query = options.query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query, language = %options.language, year = ?options.year, "searching TheTVDB");
        let series = {
            let api = self.api.lock();
            empty_if_not_found(api.search_series(query, &options.language))?
        };
        debug!(query, results = series.len(), "search finished");

        let mut results: Vec<MediaSearchResult> = series
            .into_iter()
            .map(|show| self.search_result(show, options))
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Ok(results)
    }

    fn get_metadata(&self, options: &MediaScrapeOptions) -> Result<MediaMetadata, ProviderError> {
        match options.media_type {
            MediaType::TvShow => self.show_metadata(options),
            MediaType::TvEpisode => self.episode_metadata(options),
            other => Err(ProviderError::UnsupportedMediaType(other)),
        }
    }

    fn get_episode_list(
        &self,
        options: &MediaScrapeOptions,
    ) -> Result<Vec<MediaEpisode>, ProviderError> {
        let id = Self::resolve_id(options)?;
        debug!(id, "fetching episode list");

        let mut episodes = Vec::new();
        let api = self.api.lock();
        let mut page = 1;
        loop {
            let response = match api.series_episodes(id, page, &options.language) {
                Ok(response) => response,
                Err(e) if e.is_not_found() => break,
                Err(e) => return Err(e.into()),
            };
            episodes.extend(response.data.into_iter().map(Self::media_episode));

            match response.links.and_then(|links| links.next) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        drop(api);

        debug!(id, episodes = episodes.len(), "episode list complete");
        Ok(episodes)
    }
}

impl<A: TvdbApi> TvShowArtworkProvider for TheTvDbProvider<A> {
    fn get_artwork(&self, options: &MediaScrapeOptions) -> Result<Vec<MediaArtwork>, ProviderError> {
        let id = Self::resolve_id(options)?;
        debug!(id, artwork_type = ?options.artwork_type, "fetching artwork");

        let mut images = Vec::new();
        {
            let api = self.api.lock();
            let params = empty_if_not_found(api.image_query_params(id))?;

            for param in params {
                if param.key_type == SEASONWIDE
                    || !artwork_type_wanted(options.artwork_type, &param.key_type)
                {
                    continue;
                }
                match api.images_query(id, &param.key_type) {
                    Ok(found) => images.extend(found),
                    Err(e) => warn!(id, key_type = %param.key_type, error = %e, "failed to get artwork"),
                }
            }
        }

        Ok(images
            .into_iter()
            .filter_map(|image| self.map_artwork(image))
            .collect())
    }
}

fn parse_id(value: &str) -> Option<u64> {
    value.trim().parse().ok().filter(|id| *id > 0)
}

/// Maps a missing primary record onto [`ProviderError::NotFound`]
fn not_found(error: TvdbError, what: String) -> ProviderError {
    if error.is_not_found() {
        ProviderError::NotFound(what)
    } else {
        ProviderError::Api(error)
    }
}

/// TheTVDB answers empty queries with 404
fn empty_if_not_found<T>(result: Result<Vec<T>, TvdbError>) -> Result<Vec<T>, ProviderError> {
    match result {
        Ok(items) => Ok(items),
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn artwork_type_for(key_type: &str) -> Option<MediaArtworkType> {
    match key_type {
        "fanart" => Some(MediaArtworkType::Background),
        "poster" => Some(MediaArtworkType::Poster),
        "season" => Some(MediaArtworkType::Season),
        "series" => Some(MediaArtworkType::Banner),
        _ => None,
    }
}

fn artwork_type_wanted(filter: MediaArtworkType, key_type: &str) -> bool {
    filter == MediaArtworkType::All || artwork_type_for(key_type) == Some(filter)
}
