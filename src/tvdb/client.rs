//! TheTVDB v2 REST client.

use super::types::{
    Actor, DataResponse, Episode, EpisodesPage, FullEpisode, ImageQueryParam, ImageQueryResult,
    Language, Series, TokenResponse,
};
use super::{EpisodeQuery, TvdbApi, TvdbError};
use crate::config::{RateLimitConfig, ScraperConfig};
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info, warn};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Blocking client for https://api.thetvdb.com.
///
/// The client is constructed explicitly through [`TvdbClient::connect`], which
/// authenticates and fetches the language list up front. Every request passes
/// a rate limiter first; an expired token triggers one re-login.
pub struct TvdbClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    token: Mutex<Option<String>>,
    rate_limiter: DirectRateLimiter,
    languages: Vec<Language>,
}

impl TvdbClient {
    /// Creates a client, logs in and loads the available languages.
    pub fn connect(config: &ScraperConfig) -> Result<Self, TvdbError> {
        if config.api_key.trim().is_empty() {
            return Err(TvdbError::MissingApiKey);
        }

        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TvdbError::Transport {
                url: base_url.clone(),
                source: e,
            })?;

        let mut tvdb = Self {
            client,
            base_url,
            api_key: config.api_key.trim().to_string(),
            token: Mutex::new(None),
            rate_limiter: build_rate_limiter(&config.rate_limit),
            languages: Vec::new(),
        };

        tvdb.login()?;
        tvdb.languages = tvdb.languages()?;
        info!(
            languages = tvdb.languages.len(),
            base_url = %tvdb.base_url,
            "connected to TheTVDB"
        );

        Ok(tvdb)
    }

    /// Languages loaded while connecting.
    pub fn known_languages(&self) -> &[Language] {
        &self.languages
    }

    /// Obtains a fresh bearer token.
    fn login(&self) -> Result<(), TvdbError> {
        let url = format!("{}/login", self.base_url);
        self.wait_for_permit();
        debug!(url = %url, "logging in to TheTVDB");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "apikey": self.api_key }))
            .send()
            .map_err(|e| TvdbError::Transport {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TvdbError::Unauthorized("API key rejected".to_string()));
        }
        if !status.is_success() {
            return Err(TvdbError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let token: TokenResponse = response.json().map_err(|e| TvdbError::Parse {
            url: url.clone(),
            message: e.to_string(),
        })?;
        *self.token.lock() = Some(token.token);

        Ok(())
    }

    /// Blocks until the rate limiter grants a request.
    fn wait_for_permit(&self) {
        let clock = DefaultClock::default();
        while let Err(not_until) = self.rate_limiter.check() {
            let wait = not_until.wait_time_from(clock.now());
            debug!(wait_ms = wait.as_millis() as u64, "TheTVDB request budget used up, waiting");
            std::thread::sleep(wait);
        }
    }

    /// Performs an authenticated GET and decodes the JSON body.
    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        language: Option<&str>,
    ) -> Result<T, TvdbError> {
        let url = format!("{}{}", self.base_url, path);
        let mut logged_in_again = false;

        loop {
            self.wait_for_permit();

            let mut request = self
                .client
                .get(&url)
                .query(query)
                .header(ACCEPT, "application/json");
            if let Some(token) = self.token.lock().clone() {
                request = request.bearer_auth(token);
            }
            if let Some(language) = language {
                request = request.header(ACCEPT_LANGUAGE, language);
            }

            debug!(url = %url, ?query, "TheTVDB request");
            let response = request.send().map_err(|e| TvdbError::Transport {
                url: url.clone(),
                source: e,
            })?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !logged_in_again {
                warn!(url = %url, "TheTVDB token rejected, logging in again");
                logged_in_again = true;
                self.login()?;
                continue;
            }

            return match status {
                StatusCode::NOT_FOUND => Err(TvdbError::NotFound(path.to_string())),
                StatusCode::UNAUTHORIZED => Err(TvdbError::Unauthorized(format!(
                    "token rejected for {path}"
                ))),
                status if !status.is_success() => Err(TvdbError::Http {
                    url,
                    status: status.as_u16(),
                }),
                _ => response.json().map_err(|e| TvdbError::Parse {
                    url,
                    message: e.to_string(),
                }),
            };
        }
    }

    fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        language: Option<&str>,
    ) -> Result<T, TvdbError> {
        self.get::<DataResponse<T>>(path, query, language)
            .map(|response| response.data)
    }
}

/// Spreads `max_requests` evenly over the window, allowing bursts up to the
/// full budget.
fn build_rate_limiter(config: &RateLimitConfig) -> DirectRateLimiter {
    let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs(config.window_secs.max(1)) / burst.get();
    let quota = Quota::with_period(period)
        .map(|quota| quota.allow_burst(burst))
        .unwrap_or_else(|| Quota::per_second(burst));
    RateLimiter::direct(quota)
}

impl TvdbApi for TvdbClient {
    fn languages(&self) -> Result<Vec<Language>, TvdbError> {
        self.get_data("/languages", &[], None)
    }

    fn search_series(&self, name: &str, language: &str) -> Result<Vec<Series>, TvdbError> {
        self.get_data(
            "/search/series",
            &[("name", name.to_string())],
            Some(language),
        )
    }

    fn series(&self, id: u64, language: &str) -> Result<Series, TvdbError> {
        self.get_data(&format!("/series/{id}"), &[], Some(language))
    }

    fn series_actors(&self, id: u64) -> Result<Vec<Actor>, TvdbError> {
        self.get_data(&format!("/series/{id}/actors"), &[], None)
    }

    fn series_episodes(
        &self,
        id: u64,
        page: u32,
        language: &str,
    ) -> Result<EpisodesPage, TvdbError> {
        self.get(
            &format!("/series/{id}/episodes"),
            &[("page", page.to_string())],
            Some(language),
        )
    }

    fn episodes_query(
        &self,
        id: u64,
        query: &EpisodeQuery,
        language: &str,
    ) -> Result<Vec<Episode>, TvdbError> {
        let mut params = query.params();
        params.push(("page", "1".to_string()));
        self.get_data(
            &format!("/series/{id}/episodes/query"),
            &params,
            Some(language),
        )
    }

    fn episode(&self, id: u64, language: &str) -> Result<FullEpisode, TvdbError> {
        self.get_data(&format!("/episodes/{id}"), &[], Some(language))
    }

    fn image_query_params(&self, id: u64) -> Result<Vec<ImageQueryParam>, TvdbError> {
        self.get_data(&format!("/series/{id}/images/query/params"), &[], None)
    }

    fn images_query(&self, id: u64, key_type: &str) -> Result<Vec<ImageQueryResult>, TvdbError> {
        self.get_data(
            &format!("/series/{id}/images/query"),
            &[("keyType", key_type.to_string())],
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::StubServer;

    const LOGIN: (u16, &str) = (200, r#"{"token":"first"}"#);
    const LANGUAGES: (u16, &str) = (
        200,
        r#"{"data":[{"id":7,"abbreviation":"en","name":"English"}]}"#,
    );
    const PSYCH: (u16, &str) = (200, r#"{"data":{"id":5,"seriesName":"Psych","runtime":"45"}}"#);

    fn connect(server: &StubServer) -> TvdbClient {
        let config = ScraperConfig {
            api_key: "secret".to_string(),
            api_base_url: server.base_url().to_string(),
            request_timeout_secs: 5,
            rate_limit: RateLimitConfig {
                max_requests: 1000,
                window_secs: 1,
            },
            ..Default::default()
        };
        TvdbClient::connect(&config).unwrap()
    }

    #[test]
    fn test_connect_without_api_key_fails_before_any_request() {
        let config = ScraperConfig::default();
        assert!(matches!(
            TvdbClient::connect(&config),
            Err(TvdbError::MissingApiKey)
        ));
    }

    #[test]
    fn test_connect_logs_in_and_loads_languages() {
        let server = StubServer::start(vec![LOGIN, LANGUAGES]);
        let client = connect(&server);

        assert_eq!(client.known_languages().len(), 1);
        assert_eq!(client.known_languages()[0].abbreviation, "en");

        let requests = server.requests();
        assert_eq!(requests[0].line, "POST /login");
        assert_eq!(requests[0].body, r#"{"apikey":"secret"}"#);
        assert_eq!(requests[1].line, "GET /languages");
        assert_eq!(requests[1].header("authorization"), Some("Bearer first"));
        assert_eq!(requests[1].header("accept-language"), None);
    }

    #[test]
    fn test_rejected_api_key() {
        let server = StubServer::start(vec![(401, r#"{"Error":"Not Authorized"}"#)]);
        let config = ScraperConfig {
            api_key: "wrong".to_string(),
            api_base_url: server.base_url().to_string(),
            ..Default::default()
        };
        assert!(matches!(
            TvdbClient::connect(&config),
            Err(TvdbError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_series_request_sends_token_and_language() {
        let server = StubServer::start(vec![LOGIN, LANGUAGES, PSYCH]);
        let client = connect(&server);

        let series = client.series(5, "de").unwrap();
        assert_eq!(series.id, 5);
        assert_eq!(series.series_name.as_deref(), Some("Psych"));

        let request = &server.requests()[2];
        assert_eq!(request.line, "GET /series/5");
        assert_eq!(request.header("authorization"), Some("Bearer first"));
        assert_eq!(request.header("accept-language"), Some("de"));
        assert_eq!(request.header("accept"), Some("application/json"));
    }

    #[test]
    fn test_search_passes_name_as_query() {
        let server = StubServer::start(vec![
            LOGIN,
            LANGUAGES,
            (200, r#"{"data":[{"id":5,"seriesName":"Psych"},{"id":6}]}"#),
        ]);
        let client = connect(&server);

        let results = client.search_series("Psych", "en").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(server.requests()[2].line, "GET /search/series?name=Psych");
    }

    #[test]
    fn test_expired_token_triggers_one_login() {
        let server = StubServer::start(vec![
            LOGIN,
            LANGUAGES,
            (401, r#"{"Error":"Not Authorized"}"#),
            (200, r#"{"token":"second"}"#),
            PSYCH,
        ]);
        let client = connect(&server);

        assert_eq!(client.series(5, "en").unwrap().id, 5);
        assert_eq!(
            server.request_lines(),
            vec![
                "POST /login",
                "GET /languages",
                "GET /series/5",
                "POST /login",
                "GET /series/5",
            ]
        );
        assert_eq!(
            server.requests()[4].header("authorization"),
            Some("Bearer second")
        );
    }

    #[test]
    fn test_second_rejection_is_unauthorized() {
        let server = StubServer::start(vec![
            LOGIN,
            LANGUAGES,
            (401, r#"{"Error":"Not Authorized"}"#),
            (200, r#"{"token":"second"}"#),
            (401, r#"{"Error":"Not Authorized"}"#),
        ]);
        let client = connect(&server);

        assert!(matches!(
            client.series(5, "en"),
            Err(TvdbError::Unauthorized(_))
        ));
        assert_eq!(server.request_lines().len(), 5);
    }

    #[test]
    fn test_error_statuses() {
        let server = StubServer::start(vec![
            LOGIN,
            LANGUAGES,
            (404, r#"{"Error":"ID: 6 not found"}"#),
            (500, "oops"),
            (200, "<html>maintenance</html>"),
        ]);
        let client = connect(&server);

        match client.series(6, "en") {
            Err(TvdbError::NotFound(path)) => assert_eq!(path, "/series/6"),
            other => panic!("unexpected result: {other:?}"),
        }
        match client.series(6, "en") {
            Err(TvdbError::Http { url, status }) => {
                assert_eq!(status, 500);
                assert!(url.ends_with("/series/6"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        match client.series(7, "en") {
            Err(TvdbError::Parse { url, .. }) => assert!(url.ends_with("/series/7")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_rate_limiter_allows_configured_burst() {
        let limiter = build_rate_limiter(&RateLimitConfig {
            max_requests: 3,
            window_secs: 60,
        });
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_rate_limiter_tolerates_zero_settings() {
        let limiter = build_rate_limiter(&RateLimitConfig {
            max_requests: 0,
            window_secs: 0,
        });
        assert!(limiter.check().is_ok());
    }
}
