//! RATP API response DTOs.
//!
//! These types map the parts of the v4 REST API's JSON the planner reads.
//! Other fields (`_metadata`, mission codes and station slugs) are ignored.
//! Bus and metro rows carry no mission code, so `code` is optional.

use serde::Deserialize;

/// Response from `GET /schedules/{kind}/{line}/{station}/{direction}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulesResponse {
    pub result: SchedulesResult,
}

/// Payload of a schedules response.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulesResult {
    /// Upcoming departures, in board order.
    #[serde(default)]
    pub schedules: Vec<ScheduleEntry>,
}

/// One row of a departure board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
    /// Mission (variant) code, e.g. "KASE". Only present on RER boards.
    #[serde(default)]
    pub code: Option<String>,

    /// Raw status text: "3 mn", "17:47 Voie 2", "PAS DE SERVICE", ...
    pub message: String,

    /// Destination shown on the board.
    #[serde(default)]
    pub destination: String,
}

impl ScheduleEntry {
    /// Create an entry (mostly useful for tests and fixtures).
    pub fn new(code: Option<&str>, message: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
            destination: destination.into(),
        }
    }
}

/// Response from `GET /missions/rers/{line}/{code}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionResponse {
    pub result: MissionResult,
}

/// Payload of a mission response.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionResult {
    /// Stations served by the mission, in calling order.
    #[serde(default)]
    pub stations: Vec<MissionStation>,
}

/// A station served by a mission.
#[derive(Debug, Clone, Deserialize)]
pub struct MissionStation {
    pub name: String,
}

impl MissionResponse {
    /// Station names in calling order.
    pub fn station_names(self) -> Vec<String> {
        self.result.stations.into_iter().map(|s| s.name).collect()
    }
}
