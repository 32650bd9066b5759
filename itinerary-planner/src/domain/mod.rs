//! Domain types for the itinerary planner.
//!
//! This module contains the core model: transports, legs, trips and the
//! wall-clock helpers that give raw schedule messages a date. Types enforce
//! their invariants at construction time.

mod error;
mod leg;
mod time;
mod transport;
mod trip;

pub use error::DomainError;
pub use leg::{Leg, LocTime};
pub use time::{
    Clock, FixedClock, SystemClock, format_hhmm, on_service_day, parse_hhmm_prefix,
};
pub use transport::{Direction, MessageStyle, Transport, TransportKind};
pub use trip::Trip;
