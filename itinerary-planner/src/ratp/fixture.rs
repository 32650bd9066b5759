//! Offline provider serving canned API responses.
//!
//! Loads departure boards and mission station lists from a single JSON
//! document and serves them as if they were live API responses. Useful for
//! development and testing without network access.
//!
//! ```json
//! {
//!   "schedules": [
//!     {
//!       "kind": "bus", "line": "172", "station": "Villejuif - Louis Aragon",
//!       "direction": "R",
//!       "response": {"result": {"schedules": [{"message": "8 mn", "destination": "Bourg-la-Reine"}]}}
//!     }
//!   ],
//!   "missions": {
//!     "KASE": {"result": {"stations": [{"name": "Massy Verrieres"}]}},
//!     "PISE": null
//!   }
//! }
//! ```
//!
//! A `null` mission stands for a variant the API rejects with "bad request".

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Direction, TransportKind};

use super::error::ProviderError;
use super::provider::{ScheduleProvider, station_slug};
use super::types::{MissionResponse, ScheduleEntry, SchedulesResponse};

/// Board lookup key: (kind, lower-cased line, station slug, direction).
type BoardKey = (TransportKind, String, String, Direction);

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    schedules: Vec<FixtureBoard>,
    #[serde(default)]
    missions: HashMap<String, Option<MissionResponse>>,
}

#[derive(Debug, Deserialize)]
struct FixtureBoard {
    kind: String,
    line: String,
    station: String,
    direction: String,
    response: SchedulesResponse,
}

/// Provider that serves data from a fixture document.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    boards: HashMap<BoardKey, Vec<ScheduleEntry>>,
    missions: HashMap<String, Option<Vec<String>>>,
}

impl FixtureProvider {
    /// Load fixtures from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::Fixture(format!("failed to read {:?}: {}", path, e)))?;
        Self::from_json(&json)
    }

    /// Parse fixtures from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let file: FixtureFile = serde_json::from_str(json)
            .map_err(|e| ProviderError::Fixture(format!("failed to parse fixtures: {}", e)))?;

        let mut boards = HashMap::new();
        for board in file.schedules {
            let kind = TransportKind::parse(&board.kind)
                .map_err(|e| ProviderError::Fixture(e.to_string()))?;
            let direction = Direction::parse(&board.direction)
                .map_err(|e| ProviderError::Fixture(e.to_string()))?;
            boards.insert(
                board_key(kind, &board.line, &board.station, direction),
                board.response.result.schedules,
            );
        }

        let missions = file
            .missions
            .into_iter()
            .map(|(code, response)| (code, response.map(MissionResponse::station_names)))
            .collect();

        Ok(Self { boards, missions })
    }

    /// Number of boards loaded.
    pub fn board_count(&self) -> usize {
        self.boards.len()
    }
}

fn board_key(kind: TransportKind, line: &str, station: &str, direction: Direction) -> BoardKey {
    (kind, line.to_lowercase(), station_slug(station), direction)
}

impl ScheduleProvider for FixtureProvider {
    fn fetch_schedules(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> Result<Vec<ScheduleEntry>, ProviderError> {
        self.boards
            .get(&board_key(kind, line, station, direction))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                message: format!("no fixture board for {kind} {line} at {station} ({direction})"),
            })
    }

    fn fetch_variant_stations(
        &self,
        _line: &str,
        code: &str,
    ) -> Result<Vec<String>, ProviderError> {
        match self.missions.get(code) {
            Some(Some(stations)) => Ok(stations.clone()),
            Some(None) => Err(ProviderError::BadRequest {
                message: format!("mission {code} carries no passengers"),
            }),
            None => Err(ProviderError::NotFound {
                message: format!("no fixture mission {code}"),
            }),
        }
    }
}
