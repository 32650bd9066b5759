//! RATP real-time HTTP client.
//!
//! Blocking client for the community RATP v4 REST API. Requests are made one
//! at a time on the calling thread; the search pulls boards lazily, so each
//! fetch happens only when the next candidate is needed.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{Direction, TransportKind};

use super::error::ProviderError;
use super::provider::{ScheduleProvider, station_slug};
use super::types::{MissionResponse, ScheduleEntry, SchedulesResponse};

/// Default base URL for the RATP API.
pub const DEFAULT_BASE_URL: &str = "https://api-ratp.pierre-grimaud.fr/v4";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the RATP client.
#[derive(Debug, Clone)]
pub struct RatpConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RatpConfig {
    /// Create a config pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing or a self-hosted mirror).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for RatpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// RATP API client.
#[derive(Debug, Clone)]
pub struct RatpClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl RatpClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RatpConfig) -> Result<Self, ProviderError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// URL of a departure board.
    fn schedules_url(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> String {
        // The API expects the slug's `+` separators percent-encoded
        let slug = station_slug(station).replace('+', "%2B");
        let direction = direction.as_api().replace('+', "%2B");
        format!(
            "{}/schedules/{}/{}/{}/{}",
            self.base_url,
            kind.api_name(),
            line.to_lowercase(),
            slug,
            direction
        )
    }

    /// URL of a mission's station list.
    fn mission_url(&self, line: &str, code: &str) -> String {
        format!("{}/missions/rers/{}/{}", self.base_url, line, code)
    }

    /// Get the departure board for a line at a station.
    pub fn get_schedules(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> Result<Vec<ScheduleEntry>, ProviderError> {
        let url = self.schedules_url(kind, line, station, direction);
        let response: SchedulesResponse = self.get_json(&url)?;
        Ok(response.result.schedules)
    }

    /// Get the stations a mission serves.
    pub fn get_mission_stations(
        &self,
        line: &str,
        code: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let url = self.mission_url(line, code);
        let response: MissionResponse = self.get_json(&url)?;
        Ok(response.station_names())
    }

    /// GET a URL and decode its JSON body, mapping error statuses.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send()?;
        let status = response.status();

        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::BadRequest { message: body });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::NotFound { message: body });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;

        serde_json::from_str(&body).map_err(|e| ProviderError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl ScheduleProvider for RatpClient {
    fn fetch_schedules(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> Result<Vec<ScheduleEntry>, ProviderError> {
        self.get_schedules(kind, line, station, direction)
    }

    fn fetch_variant_stations(
        &self,
        line: &str,
        code: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.get_mission_stations(line, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = RatpConfig::new()
            .with_base_url("http://localhost:8080/")
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = RatpConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn client_creation() {
        let client = RatpClient::new(RatpConfig::new());
        assert!(client.is_ok());
    }

    #[test]
    fn schedules_url_encodes_slug() {
        let client = RatpClient::new(RatpConfig::new()).unwrap();

        let url = client.schedules_url(
            TransportKind::Bus,
            "172",
            "Villejuif - Louis Aragon",
            Direction::Return,
        );
        assert_eq!(
            url,
            "https://api-ratp.pierre-grimaud.fr/v4/schedules/buses/172/villejuif%2B%2B%2Blouis%2Baragon/R"
        );

        let url = client.schedules_url(TransportKind::Rer, "B", "Bourg la Reine", Direction::Both);
        assert_eq!(
            url,
            "https://api-ratp.pierre-grimaud.fr/v4/schedules/rers/b/bourg%2Bla%2Breine/A%2BR"
        );
    }

    #[test]
    fn mission_url() {
        let client = RatpClient::new(RatpConfig::new()).unwrap();
        assert_eq!(
            client.mission_url("B", "KASE"),
            "https://api-ratp.pierre-grimaud.fr/v4/missions/rers/B/KASE"
        );
    }

    // Requests against the live API are not run in unit tests.
}
