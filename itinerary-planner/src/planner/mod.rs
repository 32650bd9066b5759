//! Itinerary planner using depth-first search.
//!
//! This module implements the core planning algorithm that answers:
//! "given the legs I need to ride, in order, which departures chain into a
//! complete trip, and which of those are worth taking?"
//!
//! Requested legs are resolved against real-time boards into candidate
//! departures, and candidates are chained into itineraries under a
//! bounded-suboptimality cutoff.

mod config;
mod resolve;
mod search;

#[cfg(test)]
mod search_tests;

pub use config::{DEFAULT_MARGIN_MINS, MAX_MARGIN_MINS, SearchConfig};
pub use resolve::{Candidates, LegResolver, ResolveError};
pub use search::{Itineraries, LinearTrips, Planner, SearchError};
