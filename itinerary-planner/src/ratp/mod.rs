//! RATP real-time API client.
//!
//! This module provides the provider abstraction the planner consumes, an
//! HTTP client for the community RATP API, and an offline fixture provider.
//!
//! Key characteristics of the API:
//! - Boards are keyed by kind, line, station slug and direction ("A", "R",
//!   "A+R")
//! - Departure times are free text whose encoding depends on the mode
//! - RER rows carry a mission code; the mission endpoint lists the stations
//!   it serves, and answers 400 for missions without passengers

mod client;
mod error;
mod fixture;
mod provider;
mod types;

pub use client::{DEFAULT_BASE_URL, RatpClient, RatpConfig};
pub use error::ProviderError;
pub use fixture::FixtureProvider;
pub use provider::{ScheduleProvider, station_slug};
pub use types::{
    MissionResponse, MissionResult, MissionStation, ScheduleEntry, SchedulesResponse,
    SchedulesResult,
};
