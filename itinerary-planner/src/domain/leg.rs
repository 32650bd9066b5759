//! Leg type.
//!
//! A `Leg` is a single ride on one route between two stations. The same type
//! describes both what the traveler asked for (a *requested* leg, no times)
//! and a concrete departure picked from a real-time board (a *resolved* leg).

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::time::format_hhmm;
use super::{Direction, Transport};

/// A location, optionally pinned to an instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocTime {
    pub location: String,
    pub time: Option<NaiveDateTime>,
}

impl LocTime {
    /// A location with no time attached yet.
    pub fn unscheduled(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            time: None,
        }
    }

    /// A location at a known instant.
    pub fn at(location: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            location: location.into(),
            time: Some(time),
        }
    }
}

impl fmt::Display for LocTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(t) => write!(f, "{} {}", self.location, format_hhmm(t)),
            None => write!(f, "{} unknown", self.location),
        }
    }
}

/// One leg of a trip.
///
/// # Invariants
///
/// - Either both endpoint times are unset (requested) or both are set
///   (resolved).
/// - When resolved, `destination.time == origin.time + nominal_duration`.
///
/// Fields are private so the only way to attach times is
/// [`Leg::resolved_at`], which upholds the invariant.
///
/// # Examples
///
/// ```
/// use itinerary_planner::domain::{Direction, Leg, Transport, TransportKind};
/// use chrono::{Duration, NaiveDate};
///
/// let bus = Transport::new(TransportKind::Bus, "172", Direction::Return);
/// let requested = Leg::requested(bus, "Villejuif", "Bourg-la-Reine", Duration::minutes(20));
/// assert!(!requested.is_resolved());
///
/// let departure = NaiveDate::from_ymd_opt(2024, 3, 15)
///     .unwrap()
///     .and_hms_opt(17, 5, 0)
///     .unwrap();
/// let leg = requested.resolved_at(departure, None).unwrap();
/// assert_eq!(leg.arrival_time(), Some(departure + Duration::minutes(20)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    transport: Transport,
    origin: LocTime,
    destination: LocTime,
    nominal_duration: Duration,
}

impl Leg {
    /// Create a requested (unscheduled) leg.
    pub fn requested(
        transport: Transport,
        from: impl Into<String>,
        to: impl Into<String>,
        nominal_duration: Duration,
    ) -> Self {
        Self {
            transport,
            origin: LocTime::unscheduled(from),
            destination: LocTime::unscheduled(to),
            nominal_duration,
        }
    }

    /// Returns this leg pinned to a concrete departure.
    ///
    /// The arrival is derived from the nominal duration. `variant` refines the
    /// transport to the service pattern that was picked, when known. `None` if
    /// the arrival falls outside the representable range.
    pub fn resolved_at(&self, departure: NaiveDateTime, variant: Option<&str>) -> Option<Self> {
        let arrival = departure.checked_add_signed(self.nominal_duration)?;
        let transport = match variant {
            Some(_) => self.transport.with_variant(variant),
            None => self.transport.clone(),
        };
        Some(Self {
            transport,
            origin: LocTime::at(self.origin.location.clone(), departure),
            destination: LocTime::at(self.destination.location.clone(), arrival),
            nominal_duration: self.nominal_duration,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn origin(&self) -> &LocTime {
        &self.origin
    }

    pub fn destination(&self) -> &LocTime {
        &self.destination
    }

    pub fn direction(&self) -> Direction {
        self.transport.direction
    }

    pub fn nominal_duration(&self) -> Duration {
        self.nominal_duration
    }

    /// Returns true once a concrete departure has been attached.
    pub fn is_resolved(&self) -> bool {
        self.origin.time.is_some()
    }

    /// Departure instant, if resolved.
    pub fn departure_time(&self) -> Option<NaiveDateTime> {
        self.origin.time
    }

    /// Arrival instant, if resolved.
    pub fn arrival_time(&self) -> Option<NaiveDateTime> {
        self.destination.time
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.transport, self.origin, self.destination
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransportKind;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn rer_leg() -> Leg {
        let rer = Transport::new(TransportKind::Rer, "B", Direction::Return);
        Leg::requested(rer, "Bourg-la-Reine", "Massy Verrieres", Duration::minutes(12))
    }

    #[test]
    fn requested_leg_has_no_times() {
        let leg = rer_leg();
        assert!(!leg.is_resolved());
        assert_eq!(leg.departure_time(), None);
        assert_eq!(leg.arrival_time(), None);
        assert_eq!(leg.direction(), Direction::Return);
    }

    #[test]
    fn resolved_arrival_follows_duration() {
        let leg = rer_leg().resolved_at(at(17, 47), Some("KASE")).unwrap();
        assert!(leg.is_resolved());
        assert_eq!(leg.departure_time(), Some(at(17, 47)));
        assert_eq!(leg.arrival_time(), Some(at(17, 59)));
        assert_eq!(leg.transport().variant.as_deref(), Some("KASE"));
        assert_eq!(leg.origin().location, "Bourg-la-Reine");
        assert_eq!(leg.destination().location, "Massy Verrieres");
    }

    #[test]
    fn resolving_without_variant_keeps_transport() {
        let leg = rer_leg().resolved_at(at(9, 0), None).unwrap();
        assert_eq!(leg.transport().variant, None);
    }

    #[test]
    fn resolving_past_the_end_of_time_fails() {
        assert_eq!(rer_leg().resolved_at(NaiveDateTime::MAX, None), None);
    }

    #[test]
    fn display_unknown_placeholder() {
        let leg = rer_leg();
        assert_eq!(
            leg.to_string(),
            "RER B (R): Bourg-la-Reine unknown -> Massy Verrieres unknown"
        );
    }

    #[test]
    fn display_resolved() {
        let leg = rer_leg().resolved_at(at(17, 47), Some("KASE")).unwrap();
        assert_eq!(
            leg.to_string(),
            "RER B (R) [KASE]: Bourg-la-Reine 17:47 -> Massy Verrieres 17:59"
        );
    }
}
