//! Depth-first itinerary search with a branch-and-bound cutoff.
//!
//! Each requested leg is resolved into candidate departures, and candidates
//! are chained so that every leg departs no earlier than the previous one
//! arrives. Two search modes are available:
//!
//! - **General**: explores every chain depth-first. At each level, the first
//!   complete itinerary found sets a bound, and anything arriving `margin` or
//!   more after it ends that level's enumeration.
//! - **Linear**: one itinerary per first-leg departure, greedily taking the
//!   first connecting departure of every later leg.
//!
//! Both are lazy iterators: pulling one itinerary performs only the fetches
//! it needs. Fetch failures prune the branch that produced them and are
//! recorded on the iterator.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, trace, warn};

use crate::domain::{Leg, Trip, format_hhmm};
use crate::ratp::ScheduleProvider;

use super::config::{MAX_MARGIN_MINS, SearchConfig};
use super::resolve::{Candidates, LegResolver, ResolveError};

/// Error from itinerary search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// Itinerary planner.
pub struct Planner<'a, P: ?Sized> {
    resolver: LegResolver<'a, P>,
    config: &'a SearchConfig,
}

impl<'a, P: ScheduleProvider + ?Sized> Planner<'a, P> {
    /// Create a new planner.
    pub fn new(resolver: LegResolver<'a, P>, config: &'a SearchConfig) -> Self {
        Self { resolver, config }
    }

    /// General search over `legs`, departing no earlier than `start`.
    pub fn itineraries(
        &self,
        legs: &'a [Leg],
        start: NaiveDateTime,
    ) -> Result<Itineraries<'a, P>, SearchError> {
        self.validate(legs, 1)?;

        let first = Frame::new(self.resolver.resolve(&legs[0], start), start);
        Ok(Itineraries {
            resolver: self.resolver,
            legs,
            margin: self.config.margin(),
            stack: vec![first],
            failures: Vec::new(),
        })
    }

    /// Linear search over `legs`, departing no earlier than `start`.
    pub fn linear(
        &self,
        legs: &'a [Leg],
        start: NaiveDateTime,
    ) -> Result<LinearTrips<'a, P>, SearchError> {
        self.validate(legs, 2)?;

        Ok(LinearTrips {
            resolver: self.resolver,
            legs,
            start,
            first: self.resolver.resolve(&legs[0], start),
            later: None,
            failures: Vec::new(),
        })
    }

    fn validate(&self, legs: &[Leg], min_legs: usize) -> Result<(), SearchError> {
        if legs.len() < min_legs {
            return Err(SearchError::InvalidRequest(format!(
                "at least {min_legs} leg(s) required, got {}",
                legs.len()
            )));
        }

        if self.config.margin_mins < 0 {
            return Err(SearchError::InvalidRequest(format!(
                "margin must not be negative, got {} min",
                self.config.margin_mins
            )));
        }
        if self.config.margin_mins > MAX_MARGIN_MINS {
            return Err(SearchError::InvalidRequest(format!(
                "margin must be at most {MAX_MARGIN_MINS} min, got {} min",
                self.config.margin_mins
            )));
        }

        for (i, leg) in legs.iter().enumerate() {
            if leg.is_resolved() {
                return Err(SearchError::InvalidRequest(format!(
                    "leg {i} is already scheduled"
                )));
            }
            if leg.nominal_duration() <= Duration::zero() {
                return Err(SearchError::InvalidRequest(format!(
                    "leg {i} must have a positive duration"
                )));
            }
        }

        Ok(())
    }
}

/// Whether `arrival` is `margin` or more after `best`.
fn too_late(arrival: NaiveDateTime, best: NaiveDateTime, margin: Duration) -> bool {
    best.checked_add_signed(margin).is_some_and(|bound| arrival >= bound)
}

/// Departure and arrival of a resolved leg.
fn endpoints(leg: &Leg) -> Option<(NaiveDateTime, NaiveDateTime)> {
    Some((leg.departure_time()?, leg.arrival_time()?))
}

/// One level of the depth-first search.
struct Frame<'a, P: ?Sized> {
    candidates: Candidates<'a, P>,
    /// Candidates departing before this are skipped.
    floor: NaiveDateTime,
    /// Arrival of the first complete itinerary found through this level.
    best: Option<NaiveDateTime>,
    /// Candidate whose continuations are being explored by the next level.
    current: Option<Leg>,
}

impl<'a, P: ?Sized> Frame<'a, P> {
    fn new(candidates: Candidates<'a, P>, floor: NaiveDateTime) -> Self {
        Self {
            candidates,
            floor,
            best: None,
            current: None,
        }
    }
}

/// Lazy iterator over itineraries found by the general search.
///
/// The stack holds one frame per leg being explored; the `current`
/// candidates of all frames below the top form the partial itinerary.
pub struct Itineraries<'a, P: ?Sized> {
    resolver: LegResolver<'a, P>,
    legs: &'a [Leg],
    margin: Duration,
    stack: Vec<Frame<'a, P>>,
    failures: Vec<ResolveError>,
}

impl<'a, P: ScheduleProvider + ?Sized> Itineraries<'a, P> {
    /// Fetch failures encountered so far.
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }

    /// Drop the top frame; its parent moves on to its next candidate.
    fn unwind(&mut self) {
        self.stack.pop();
        if let Some(parent) = self.stack.last_mut() {
            parent.current = None;
        }
    }

    /// Offer a complete itinerary arriving at `arrival` to every enclosing
    /// level, innermost first.
    ///
    /// The first itinerary through a level sets its bound. One arriving
    /// `margin` or more after the bound is discarded and ends that level's
    /// exploration of its current candidate. Returns whether the itinerary
    /// survived every level.
    fn settle(&mut self, arrival: NaiveDateTime) -> bool {
        let margin = self.margin;
        for level in (0..self.stack.len().saturating_sub(1)).rev() {
            match self.stack[level].best {
                None => self.stack[level].best = Some(arrival),
                Some(best) if too_late(arrival, best, margin) => {
                    debug!(
                        level,
                        arrival = %format_hhmm(arrival),
                        best = %format_hhmm(best),
                        "Cut: itinerary arrives too late"
                    );
                    self.stack.truncate(level + 1);
                    self.stack[level].current = None;
                    return false;
                }
                Some(_) => {}
            }
        }
        true
    }

    fn assemble(&self, last: Leg) -> Option<Trip> {
        let legs: Vec<Leg> = self
            .stack
            .iter()
            .filter_map(|frame| frame.current.clone())
            .chain(std::iter::once(last))
            .collect();

        match Trip::new(legs) {
            Ok(trip) => Some(trip),
            Err(e) => {
                warn!(error = %e, "Discarding inconsistent itinerary");
                None
            }
        }
    }
}

impl<P: ScheduleProvider + ?Sized> Iterator for Itineraries<'_, P> {
    type Item = Trip;

    fn next(&mut self) -> Option<Trip> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let frame = self.stack.last_mut()?;

            let candidate = match frame.candidates.next() {
                None => {
                    trace!(depth, "Level exhausted");
                    self.unwind();
                    continue;
                }
                Some(Err(e)) => {
                    warn!(depth, error = %e, "Pruning branch after fetch failure");
                    self.failures.push(e);
                    continue;
                }
                Some(Ok(candidate)) => candidate,
            };

            let Some((departure, arrival)) = endpoints(&candidate) else {
                continue;
            };
            if departure < frame.floor {
                trace!(depth, departure = %format_hhmm(departure), "Departs before floor");
                continue;
            }

            if let Some(best) = frame.best
                && too_late(arrival, best, self.margin)
            {
                debug!(
                    depth,
                    arrival = %format_hhmm(arrival),
                    best = %format_hhmm(best),
                    "Cut: candidate arrives too late"
                );
                self.unwind();
                continue;
            }

            if depth + 1 == self.legs.len() {
                // Innermost leg: the itinerary is complete
                if self.settle(arrival)
                    && let Some(trip) = self.assemble(candidate)
                {
                    return Some(trip);
                }
                continue;
            }

            frame.current = Some(candidate);
            let legs = self.legs;
            let candidates = self.resolver.resolve(&legs[depth + 1], arrival);
            self.stack.push(Frame::new(candidates, arrival));
        }
    }
}

/// Lazy iterator over itineraries found by the linear search.
///
/// Every leg after the first is resolved once, on the first feasible
/// first-leg departure, and its candidates reused for all others.
pub struct LinearTrips<'a, P: ?Sized> {
    resolver: LegResolver<'a, P>,
    legs: &'a [Leg],
    start: NaiveDateTime,
    first: Candidates<'a, P>,
    later: Option<Vec<Vec<Leg>>>,
    failures: Vec<ResolveError>,
}

impl<P: ScheduleProvider + ?Sized> LinearTrips<'_, P> {
    /// Fetch failures encountered so far.
    pub fn failures(&self) -> &[ResolveError] {
        &self.failures
    }

    fn resolve_later_legs(&mut self) {
        if self.later.is_some() {
            return;
        }

        let legs = self.legs;
        let mut later = Vec::with_capacity(legs.len() - 1);
        for leg in &legs[1..] {
            let mut candidates = Vec::new();
            for result in self.resolver.resolve(leg, self.start) {
                match result {
                    Ok(candidate) => candidates.push(candidate),
                    Err(e) => {
                        warn!(leg = %leg, error = %e, "No departures for leg");
                        self.failures.push(e);
                    }
                }
            }
            later.push(candidates);
        }
        self.later = Some(later);
    }
}

impl<P: ScheduleProvider + ?Sized> Iterator for LinearTrips<'_, P> {
    type Item = Trip;

    fn next(&mut self) -> Option<Trip> {
        'first: loop {
            let first = match self.first.next()? {
                Ok(first) => first,
                Err(e) => {
                    warn!(error = %e, "No departures for first leg");
                    self.failures.push(e);
                    continue;
                }
            };

            let Some((departure, mut cursor)) = endpoints(&first) else {
                continue;
            };
            if departure < self.start {
                continue;
            }

            self.resolve_later_legs();
            let later = self.later.as_deref().unwrap_or(&[]);

            let mut legs = Vec::with_capacity(self.legs.len());
            legs.push(first);
            for (index, candidates) in later.iter().enumerate() {
                let connection = candidates.iter().find_map(|leg| {
                    let (departure, arrival) = endpoints(leg)?;
                    (departure > cursor).then_some((leg, arrival))
                });
                let Some((leg, arrival)) = connection else {
                    debug!(
                        leg = index + 1,
                        after = %format_hhmm(cursor),
                        "No connecting departure, discarding branch"
                    );
                    continue 'first;
                };
                legs.push(leg.clone());
                cursor = arrival;
            }

            match Trip::new(legs) {
                Ok(trip) => return Some(trip),
                Err(e) => warn!(error = %e, "Discarding inconsistent itinerary"),
            }
        }
    }
}
