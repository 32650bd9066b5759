//! Turning a requested leg into concrete candidate departures.

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::domain::{Clock, Leg, TransportKind};
use crate::ratp::{ProviderError, ScheduleEntry, ScheduleProvider};
use crate::schedule::parse_message;
use crate::variants::VariantClassifier;

/// Error from resolving a leg.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The departure board could not be fetched
    #[error("failed to fetch {kind} {line} departures from {station}: {source}")]
    Fetch {
        kind: TransportKind,
        line: String,
        station: String,
        #[source]
        source: ProviderError,
    },
}

/// Resolves requested legs against a schedule provider.
///
/// Holds only shared references, so it is freely copied into every
/// candidate sequence it produces.
pub struct LegResolver<'a, P: ?Sized> {
    provider: &'a P,
    classifier: &'a VariantClassifier,
    clock: &'a dyn Clock,
}

// Manual impls: a derive would require `P: Clone`.
impl<P: ?Sized> Clone for LegResolver<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for LegResolver<'_, P> {}

impl<'a, P: ScheduleProvider + ?Sized> LegResolver<'a, P> {
    /// Create a resolver.
    pub fn new(provider: &'a P, classifier: &'a VariantClassifier, clock: &'a dyn Clock) -> Self {
        Self {
            provider,
            classifier,
            clock,
        }
    }

    /// Candidate departures for a requested leg, in board order.
    ///
    /// Nothing is fetched until the first item is pulled. `not_before` is
    /// carried as a hint for the consumer and does not filter candidates.
    pub fn resolve(&self, leg: &'a Leg, not_before: NaiveDateTime) -> Candidates<'a, P> {
        Candidates {
            resolver: *self,
            leg,
            not_before,
            state: State::Pending,
        }
    }
}

enum State {
    Pending,
    Ready {
        entries: std::vec::IntoIter<ScheduleEntry>,
        now: NaiveDateTime,
    },
    Done,
}

/// Lazy sequence of resolved legs for one requested leg.
///
/// A fetch failure is yielded once as an error, then the sequence ends.
pub struct Candidates<'a, P: ?Sized> {
    resolver: LegResolver<'a, P>,
    leg: &'a Leg,
    not_before: NaiveDateTime,
    state: State,
}

impl<'a, P: ScheduleProvider + ?Sized> Candidates<'a, P> {
    /// The earliest departure the consumer is interested in.
    pub fn not_before(&self) -> NaiveDateTime {
        self.not_before
    }

    /// The requested leg being resolved.
    pub fn leg(&self) -> &'a Leg {
        self.leg
    }

    fn fetch(&self) -> Result<Vec<ScheduleEntry>, ResolveError> {
        let transport = self.leg.transport();
        let station = &self.leg.origin().location;

        self.resolver
            .provider
            .fetch_schedules(transport.kind, &transport.line, station, transport.direction)
            .map_err(|source| ResolveError::Fetch {
                kind: transport.kind,
                line: transport.line.clone(),
                station: station.clone(),
                source,
            })
    }
}

impl<P: ScheduleProvider + ?Sized> Iterator for Candidates<'_, P> {
    type Item = Result<Leg, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let State::Pending = self.state {
            match self.fetch() {
                Ok(entries) => {
                    debug!(leg = %self.leg, entries = entries.len(), "Fetched departure board");
                    // Countdowns are relative to when the board was read
                    let now = self.resolver.clock.now();
                    self.state = State::Ready {
                        entries: entries.into_iter(),
                        now,
                    };
                }
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }

        let State::Ready { entries, now } = &mut self.state else {
            return None;
        };
        let now = *now;

        entries
            .by_ref()
            .find_map(|entry| candidate(&self.resolver, self.leg, &entry, now))
            .map(Ok)
    }
}

/// Build the resolved leg for one board entry, or `None` if the entry is
/// not a usable departure.
fn candidate<P: ScheduleProvider + ?Sized>(
    resolver: &LegResolver<'_, P>,
    leg: &Leg,
    entry: &ScheduleEntry,
    now: NaiveDateTime,
) -> Option<Leg> {
    let transport = leg.transport();

    if transport.kind.filters_variants() {
        let Some(code) = entry.code.as_deref() else {
            trace!(message = %entry.message, "Dropping entry without variant code");
            return None;
        };
        let target = &leg.destination().location;
        if !resolver
            .classifier
            .classifies(resolver.provider, &transport.line, code, target)
        {
            trace!(code, target = %target, "Variant does not serve destination");
            return None;
        }
    }

    let Some(departure) = parse_message(transport.kind.message_style(), &entry.message, now) else {
        trace!(
            message = %entry.message,
            destination = %entry.destination,
            "Not a schedule"
        );
        return None;
    };

    let resolved = departure
        .instant(now)
        .and_then(|instant| leg.resolved_at(instant, entry.code.as_deref()));
    if resolved.is_none() {
        trace!(message = %entry.message, "Departure out of range");
    }
    resolved
}
