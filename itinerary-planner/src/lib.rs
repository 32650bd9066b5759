//! Multi-leg public transit itinerary planner.
//!
//! Answers: "I have to ride these lines in this order; given the departures
//! on the boards right now, which complete trips can I make, and which are
//! worth taking?"

pub mod cache;
pub mod domain;
pub mod planner;
pub mod ratp;
pub mod request;
pub mod schedule;
pub mod variants;
