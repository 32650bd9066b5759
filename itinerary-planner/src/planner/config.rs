//! Search configuration for the itinerary planner.

use chrono::Duration;

/// Default cutoff margin, in minutes.
pub const DEFAULT_MARGIN_MINS: i64 = 31;

/// Largest cutoff margin a search accepts, in minutes.
pub const MAX_MARGIN_MINS: i64 = 24 * 60;

/// Configuration parameters for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How much later than the first itinerary found at a level another
    /// itinerary may arrive before the search stops exploring that level
    /// (minutes).
    pub margin_mins: i64,

    /// Maximum number of itineraries to report.
    pub max_results: usize,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(margin_mins: i64, max_results: usize) -> Self {
        Self {
            margin_mins,
            max_results,
        }
    }

    /// Set the cutoff margin.
    pub fn with_margin_mins(mut self, margin_mins: i64) -> Self {
        self.margin_mins = margin_mins;
        self
    }

    /// Returns the cutoff margin as a Duration, clamped to
    /// `±MAX_MARGIN_MINS`.
    pub fn margin(&self) -> Duration {
        Duration::minutes(self.margin_mins.clamp(-MAX_MARGIN_MINS, MAX_MARGIN_MINS))
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            margin_mins: DEFAULT_MARGIN_MINS,
            max_results: 10,
        }
    }
}
