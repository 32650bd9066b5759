//! Trip type.
//!
//! A `Trip` is a complete itinerary: legs in riding order, each with a
//! concrete departure, each departing no earlier than the previous arrival.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::time::format_hhmm;
use super::{DomainError, Leg};

/// A complete itinerary.
///
/// # Invariants
///
/// - At least one leg
/// - Every leg is resolved
/// - `legs[i + 1]` departs no earlier than `legs[i]` arrives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    legs: Vec<Leg>,
    departure: NaiveDateTime,
    arrival: NaiveDateTime,
}

impl Trip {
    /// Construct a trip, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the leg list is empty, a leg is unresolved, or a leg
    /// departs before the previous one arrives.
    pub fn new(legs: Vec<Leg>) -> Result<Self, DomainError> {
        let mut times = Vec::with_capacity(legs.len());
        for (index, leg) in legs.iter().enumerate() {
            match (leg.departure_time(), leg.arrival_time()) {
                (Some(dep), Some(arr)) => times.push((dep, arr)),
                _ => return Err(DomainError::UnresolvedLeg(index)),
            }
        }

        for (index, pair) in times.windows(2).enumerate() {
            let (_, prev_arrival) = pair[0];
            let (next_departure, _) = pair[1];
            if next_departure < prev_arrival {
                return Err(DomainError::OutOfOrder {
                    index: index + 1,
                    departs: format_hhmm(next_departure),
                    arrives: format_hhmm(prev_arrival),
                });
            }
        }

        let (departure, _) = *times.first().ok_or(DomainError::EmptyTrip)?;
        let (_, arrival) = *times.last().ok_or(DomainError::EmptyTrip)?;

        Ok(Trip {
            legs,
            departure,
            arrival,
        })
    }

    /// Returns the legs in riding order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the number of legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Always false: trips are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Departure of the first leg.
    pub fn departure_time(&self) -> NaiveDateTime {
        self.departure
    }

    /// Arrival of the last leg.
    pub fn arrival_time(&self) -> NaiveDateTime {
        self.arrival
    }

    /// Door-to-door duration.
    pub fn total_duration(&self) -> Duration {
        self.arrival - self.departure
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trip {} -> {} ({} min):",
            format_hhmm(self.departure),
            format_hhmm(self.arrival),
            self.total_duration().num_minutes()
        )?;
        for leg in &self.legs {
            write!(f, "\n- {leg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Transport, TransportKind};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn bus() -> Leg {
        let t = Transport::new(TransportKind::Bus, "172", Direction::Return);
        Leg::requested(t, "Villejuif", "Bourg-la-Reine", Duration::minutes(20))
    }

    fn rer() -> Leg {
        let t = Transport::new(TransportKind::Rer, "B", Direction::Return);
        Leg::requested(t, "Bourg-la-Reine", "Massy Verrieres", Duration::minutes(12))
    }

    #[test]
    fn valid_two_leg_trip() {
        let trip = Trip::new(vec![
            bus().resolved_at(at(17, 5), None).unwrap(),
            rer().resolved_at(at(17, 30), Some("KASE")).unwrap(),
        ])
        .unwrap();

        assert_eq!(trip.len(), 2);
        assert_eq!(trip.departure_time(), at(17, 5));
        assert_eq!(trip.arrival_time(), at(17, 42));
        assert_eq!(trip.total_duration(), Duration::minutes(37));
    }

    #[test]
    fn connection_at_exact_arrival_is_allowed() {
        let trip = Trip::new(vec![
            bus().resolved_at(at(17, 5), None).unwrap(),
            rer().resolved_at(at(17, 25), None).unwrap(),
        ]);
        assert!(trip.is_ok());
    }

    #[test]
    fn empty_trip_rejected() {
        assert_eq!(Trip::new(vec![]), Err(DomainError::EmptyTrip));
    }

    #[test]
    fn unresolved_leg_rejected() {
        let result = Trip::new(vec![bus().resolved_at(at(17, 5), None).unwrap(), rer()]);
        assert_eq!(result, Err(DomainError::UnresolvedLeg(1)));
    }

    #[test]
    fn out_of_order_rejected() {
        let result = Trip::new(vec![
            bus().resolved_at(at(17, 5), None).unwrap(),
            rer().resolved_at(at(17, 20), None).unwrap(),
        ]);
        assert!(matches!(
            result,
            Err(DomainError::OutOfOrder { index: 1, .. })
        ));
    }

    #[test]
    fn display_lists_legs() {
        let trip = Trip::new(vec![
            bus().resolved_at(at(17, 5), None).unwrap(),
            rer().resolved_at(at(17, 30), Some("KASE")).unwrap(),
        ])
        .unwrap();

        let expected = "Trip 17:05 -> 17:42 (37 min):\n\
            - bus 172 (R): Villejuif 17:05 -> Bourg-la-Reine 17:25\n\
            - RER B (R) [KASE]: Bourg-la-Reine 17:30 -> Massy Verrieres 17:42";
        assert_eq!(trip.to_string(), expected);
    }
}
