//! Unit tests for the itinerary search.
//!
//! Every scenario starts at 10:00 with two countdown legs:
//!
//! | leg | board                         | duration |
//! |-----|-------------------------------|----------|
//! | A   | at stop, 10 mn, 30 mn         | 10 min   |
//! | B   | 15 mn, 25 mn, 60 mn           | 10 min   |

use super::*;
use crate::domain::{Direction, FixedClock, Leg, Transport, TransportKind, Trip};
use crate::ratp::{FixtureProvider, ProviderError, ScheduleEntry, ScheduleProvider};
use crate::request::TripRequest;
use crate::variants::{MemoryStore, VariantClassifier};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;

fn time(s: &str) -> NaiveDateTime {
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    date.and_time(NaiveTime::parse_from_str(s, "%H:%M").unwrap())
}

fn start() -> NaiveDateTime {
    time("10:00")
}

/// Stub provider serving countdown boards keyed by line.
struct StubProvider {
    boards: HashMap<String, Vec<ScheduleEntry>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StubProvider {
    fn new() -> Self {
        Self {
            boards: HashMap::new(),
            fetches: Mutex::new(HashMap::new()),
        }
    }

    fn board(mut self, line: &str, messages: &[&str]) -> Self {
        let entries = messages
            .iter()
            .map(|m| ScheduleEntry::new(None, *m, "Terminus"))
            .collect();
        self.boards.insert(line.to_string(), entries);
        self
    }

    fn fetch_count(&self, line: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(line)
            .copied()
            .unwrap_or(0)
    }
}

impl ScheduleProvider for StubProvider {
    fn fetch_schedules(
        &self,
        _kind: TransportKind,
        line: &str,
        _station: &str,
        _direction: Direction,
    ) -> Result<Vec<ScheduleEntry>, ProviderError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(line.to_string())
            .or_default() += 1;
        self.boards
            .get(line)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 503,
                message: format!("board for {line} unavailable"),
            })
    }

    fn fetch_variant_stations(
        &self,
        _line: &str,
        code: &str,
    ) -> Result<Vec<String>, ProviderError> {
        Err(ProviderError::BadRequest {
            message: code.to_string(),
        })
    }
}

fn leg(line: &str, from: &str, to: &str, mins: i64) -> Leg {
    Leg::requested(
        Transport::new(TransportKind::Bus, line, Direction::Outbound),
        from,
        to,
        Duration::minutes(mins),
    )
}

fn two_legs() -> Vec<Leg> {
    vec![leg("A", "Home", "Hub", 10), leg("B", "Hub", "Work", 10)]
}

fn standard_provider() -> StubProvider {
    StubProvider::new()
        .board("A", &["A l'arret", "10 mn", "30 mn"])
        .board("B", &["15 mn", "25 mn", "60 mn"])
}

/// Departure times of each leg, as "HH:MM" strings.
fn departures(trip: &Trip) -> Vec<String> {
    trip.legs()
        .iter()
        .map(|l| l.departure_time().unwrap().format("%H:%M").to_string())
        .collect()
}

struct Outcome {
    trips: Vec<Trip>,
    failures: usize,
}

fn run_general(provider: &StubProvider, legs: &[Leg], margin_mins: i64) -> Outcome {
    let clock = FixedClock(start());
    let classifier = VariantClassifier::open(MemoryStore::new()).unwrap();
    let config = SearchConfig::default().with_margin_mins(margin_mins);
    let planner = Planner::new(LegResolver::new(provider, &classifier, &clock), &config);

    let mut search = planner.itineraries(legs, start()).unwrap();
    let trips: Vec<Trip> = search.by_ref().collect();
    Outcome {
        trips,
        failures: search.failures().len(),
    }
}

fn run_linear(provider: &StubProvider, legs: &[Leg]) -> Outcome {
    let clock = FixedClock(start());
    let classifier = VariantClassifier::open(MemoryStore::new()).unwrap();
    let config = SearchConfig::default();
    let planner = Planner::new(LegResolver::new(provider, &classifier, &clock), &config);

    let mut search = planner.linear(legs, start()).unwrap();
    let trips: Vec<Trip> = search.by_ref().collect();
    Outcome {
        trips,
        failures: search.failures().len(),
    }
}

// ========== General mode ==========

#[test]
fn general_prunes_with_margin() {
    let provider = standard_provider();
    let legs = two_legs();

    let outcome = run_general(&provider, &legs, 15);

    // First result arrives 10:25, so the bound is 10:40:
    // B at 11:00 is cut for both A departures, and A at 10:30 (arriving
    // 10:40) ends the search.
    let found: Vec<Vec<String>> = outcome.trips.iter().map(departures).collect();
    assert_eq!(
        found,
        vec![
            vec!["10:00", "10:15"],
            vec!["10:00", "10:25"],
            vec!["10:10", "10:25"],
        ]
    );
    assert_eq!(outcome.failures, 0);
}

#[test]
fn general_fetches_lazily() {
    let provider = standard_provider();
    let legs = two_legs();

    run_general(&provider, &legs, 15);

    // B is resolved once per explored A departure
    assert_eq!(provider.fetch_count("A"), 1);
    assert_eq!(provider.fetch_count("B"), 2);
}

#[test]
fn general_first_result_fetches_once_per_leg() {
    let provider = standard_provider();
    let legs = two_legs();
    let clock = FixedClock(start());
    let classifier = VariantClassifier::open(MemoryStore::new()).unwrap();
    let config = SearchConfig::default();
    let planner = Planner::new(LegResolver::new(&provider, &classifier, &clock), &config);

    let first = planner.itineraries(&legs, start()).unwrap().next().unwrap();

    assert_eq!(departures(&first), vec!["10:00", "10:15"]);
    assert_eq!(first.arrival_time(), time("10:25"));
    assert_eq!(provider.fetch_count("A"), 1);
    assert_eq!(provider.fetch_count("B"), 1);
}

#[test]
fn general_with_zero_margin_keeps_only_first() {
    let provider = standard_provider();
    let legs = two_legs();

    let outcome = run_general(&provider, &legs, 0);

    assert_eq!(outcome.trips.len(), 1);
    assert_eq!(departures(&outcome.trips[0]), vec!["10:00", "10:15"]);
}

#[test]
fn general_with_wide_margin_keeps_every_connection() {
    let provider = standard_provider();
    let legs = two_legs();

    let outcome = run_general(&provider, &legs, 240);

    // A 10:00 → B 10:15, 10:25, 11:00
    // A 10:10 → B 10:25, 11:00
    // A 10:30 → B 11:00
    assert_eq!(outcome.trips.len(), 6);
}

#[test]
fn general_allows_immediate_connection() {
    // A arrives 10:15, B departs 10:15
    let provider = StubProvider::new()
        .board("A", &["A l'arret"])
        .board("B", &["15 mn"]);
    let legs = vec![leg("A", "Home", "Hub", 15), leg("B", "Hub", "Work", 10)];

    let outcome = run_general(&provider, &legs, 31);

    assert_eq!(outcome.trips.len(), 1);
    assert_eq!(outcome.trips[0].arrival_time(), time("10:25"));
}

#[test]
fn general_single_leg() {
    let provider = standard_provider();
    let legs = vec![leg("A", "Home", "Hub", 10)];

    let outcome = run_general(&provider, &legs, 0);

    // A single level never sets a bound
    assert_eq!(outcome.trips.len(), 3);
    assert!(outcome.trips.iter().all(|t| t.len() == 1));
}

#[test]
fn general_skips_departures_before_start() {
    let provider = standard_provider();
    let legs = two_legs();
    let clock = FixedClock(start());
    let classifier = VariantClassifier::open(MemoryStore::new()).unwrap();
    let config = SearchConfig::default().with_margin_mins(240);
    let planner = Planner::new(LegResolver::new(&provider, &classifier, &clock), &config);

    let trips: Vec<Trip> = planner
        .itineraries(&legs, time("10:05"))
        .unwrap()
        .collect();

    assert!(!trips.is_empty());
    assert!(trips.iter().all(|t| t.departure_time() >= time("10:05")));
}

#[test]
fn general_drops_out_of_range_countdown() {
    let provider = StubProvider::new().board("A", &["999999999999 mn", "5 mn"]);
    let legs = vec![leg("A", "Home", "Hub", 10)];

    let outcome = run_general(&provider, &legs, 31);

    let found: Vec<Vec<String>> = outcome.trips.iter().map(departures).collect();
    assert_eq!(found, vec![vec!["10:05"]]);
    assert_eq!(outcome.failures, 0);
}

#[test]
fn general_three_legs() {
    let provider = standard_provider().board("C", &["40 mn", "50 mn"]);
    let legs = vec![
        leg("A", "Home", "Hub", 10),
        leg("B", "Hub", "Station", 10),
        leg("C", "Station", "Work", 5),
    ];

    let outcome = run_general(&provider, &legs, 15);

    for trip in &outcome.trips {
        assert_eq!(trip.len(), 3);
        let legs = trip.legs();
        for pair in legs.windows(2) {
            assert!(pair[1].departure_time() >= pair[0].arrival_time());
        }
    }
    let first = &outcome.trips[0];
    assert_eq!(departures(first), vec!["10:00", "10:15", "10:40"]);
}

#[test]
fn general_cuts_at_inner_level() {
    let provider = StubProvider::new()
        .board("A", &["A l'arret", "5 mn"])
        .board("B", &["5 mn", "10 mn"])
        .board("C", &["10 mn", "20 mn", "30 mn"]);
    let legs = vec![
        leg("A", "Home", "Hub", 5),
        leg("B", "Hub", "Station", 5),
        leg("C", "Station", "Work", 5),
    ];

    let outcome = run_general(&provider, &legs, 15);

    // A 10:00 / B 10:05 sets both bounds at 10:15, so C 10:30 (arriving
    // 10:35) is cut at the B level and A 10:00 moves on to B 10:10.
    // Under A 10:05, B starts a fresh bound at 10:25 and the 10:35 arrival
    // is cut by A's bound instead.
    let found: Vec<Vec<String>> = outcome.trips.iter().map(departures).collect();
    assert_eq!(
        found,
        vec![
            vec!["10:00", "10:05", "10:10"],
            vec!["10:00", "10:05", "10:20"],
            vec!["10:00", "10:10", "10:20"],
            vec!["10:05", "10:10", "10:20"],
        ]
    );
    assert_eq!(provider.fetch_count("A"), 1);
    assert_eq!(provider.fetch_count("B"), 2);
    assert_eq!(provider.fetch_count("C"), 3);
}

#[test]
fn general_prunes_failed_branch() {
    let provider = StubProvider::new().board("A", &["A l'arret", "10 mn", "30 mn"]);
    let legs = two_legs();

    let outcome = run_general(&provider, &legs, 15);

    assert!(outcome.trips.is_empty());
    // B is retried under every A departure, none of which produce a bound
    assert_eq!(outcome.failures, 3);
    assert_eq!(provider.fetch_count("B"), 3);
}

#[test]
fn general_failure_on_first_leg() {
    let provider = StubProvider::new();
    let legs = two_legs();

    let outcome = run_general(&provider, &legs, 15);

    assert!(outcome.trips.is_empty());
    assert_eq!(outcome.failures, 1);
    assert_eq!(provider.fetch_count("B"), 0);
}

// ========== Linear mode ==========

#[test]
fn linear_one_trip_per_first_departure() {
    let provider = standard_provider();
    let legs = two_legs();

    let outcome = run_linear(&provider, &legs);

    let found: Vec<Vec<String>> = outcome.trips.iter().map(departures).collect();
    assert_eq!(
        found,
        vec![
            vec!["10:00", "10:15"],
            vec!["10:10", "10:25"],
            vec!["10:30", "11:00"],
        ]
    );
    // Later legs are resolved once
    assert_eq!(provider.fetch_count("B"), 1);
}

#[test]
fn linear_discards_unconnected_branches() {
    let provider = StubProvider::new()
        .board("A", &["A l'arret", "10 mn", "30 mn"])
        .board("B", &["15 mn"]);
    let legs = two_legs();

    let outcome = run_linear(&provider, &legs);

    assert_eq!(outcome.trips.len(), 1);
    assert_eq!(departures(&outcome.trips[0]), vec!["10:00", "10:15"]);
    assert!(outcome.trips.iter().all(|t| t.len() == 2));
}

#[test]
fn linear_requires_strictly_later_departure() {
    let provider = StubProvider::new()
        .board("A", &["A l'arret"])
        .board("B", &["15 mn"]);
    let legs = vec![leg("A", "Home", "Hub", 15), leg("B", "Hub", "Work", 10)];

    assert!(run_linear(&provider, &legs).trips.is_empty());
    assert_eq!(run_general(&provider, &legs, 31).trips.len(), 1);
}

#[test]
fn linear_records_failure_of_later_leg() {
    let provider = StubProvider::new().board("A", &["A l'arret", "10 mn"]);
    let legs = two_legs();

    let outcome = run_linear(&provider, &legs);

    assert!(outcome.trips.is_empty());
    assert_eq!(outcome.failures, 1);
    assert_eq!(provider.fetch_count("B"), 1);
}

// ========== Validation ==========

fn planner_error(legs: &[Leg], margin_mins: i64, linear: bool) -> Option<SearchError> {
    let provider = standard_provider();
    let clock = FixedClock(start());
    let classifier = VariantClassifier::open(MemoryStore::new()).unwrap();
    let config = SearchConfig::default().with_margin_mins(margin_mins);
    let planner = Planner::new(LegResolver::new(&provider, &classifier, &clock), &config);

    if linear {
        planner.linear(legs, start()).err()
    } else {
        planner.itineraries(legs, start()).err()
    }
}

#[test]
fn rejects_empty_request() {
    assert!(matches!(
        planner_error(&[], 31, false),
        Some(SearchError::InvalidRequest(_))
    ));
}

#[test]
fn linear_needs_two_legs() {
    let legs = vec![leg("A", "Home", "Hub", 10)];
    assert!(planner_error(&legs, 31, true).is_some());
    assert!(planner_error(&legs, 31, false).is_none());
}

#[test]
fn rejects_scheduled_leg() {
    let legs = vec![
        leg("A", "Home", "Hub", 10)
            .resolved_at(start(), None)
            .unwrap(),
    ];
    assert!(planner_error(&legs, 31, false).is_some());
}

#[test]
fn rejects_non_positive_duration() {
    let legs = vec![leg("A", "Home", "Hub", 0), leg("B", "Hub", "Work", 10)];
    assert!(planner_error(&legs, 31, false).is_some());
    assert!(planner_error(&legs, 31, true).is_some());
}

#[test]
fn rejects_negative_margin() {
    assert!(planner_error(&two_legs(), -1, false).is_some());
}

#[test]
fn rejects_margin_beyond_a_day() {
    assert!(planner_error(&two_legs(), MAX_MARGIN_MINS, false).is_none());
    assert!(matches!(
        planner_error(&two_legs(), MAX_MARGIN_MINS + 1, false),
        Some(SearchError::InvalidRequest(_))
    ));
    assert!(matches!(
        planner_error(&two_legs(), i64::MAX, false),
        Some(SearchError::InvalidRequest(_))
    ));
    assert!(planner_error(&two_legs(), i64::MAX, true).is_some());
}

// ========== Bundled fixtures ==========

#[test]
fn plans_bundled_trip_from_fixtures() {
    let dir = env!("CARGO_MANIFEST_DIR");
    let provider =
        FixtureProvider::load(format!("{dir}/data/fixtures/villejuif_massy.json")).unwrap();
    let request = TripRequest::load(format!("{dir}/data/trips/villejuif_massy.json")).unwrap();
    let legs = request.legs().unwrap();
    let clock = FixedClock(time("17:41"));
    let classifier = VariantClassifier::open(MemoryStore::new()).unwrap();
    let config = SearchConfig::default();
    let planner = Planner::new(LegResolver::new(&provider, &classifier, &clock), &config);

    let general: Vec<Trip> = planner.itineraries(&legs, time("17:41")).unwrap().collect();
    let linear: Vec<Trip> = planner.linear(&legs, time("17:41")).unwrap().collect();

    // Bus at 17:41 reaches Bourg la Reine at 18:01; the 18:02 KASE is the
    // only later train that stops at Massy Verrieres.
    assert_eq!(general, linear);
    assert_eq!(general.len(), 1);
    assert_eq!(departures(&general[0]), vec!["17:41", "18:02"]);
    assert_eq!(general[0].arrival_time(), time("18:14"));
    assert_eq!(
        general[0].legs()[1].transport().variant.as_deref(),
        Some("KASE")
    );
    assert_eq!(classifier.stations("SOSO"), Some(vec![]));
}

// ========== Properties ==========

fn board_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..90, 0..6).prop_map(|mut mins| {
        mins.sort_unstable();
        mins
    })
}

fn countdown_board(mins: &[u8]) -> Vec<String> {
    mins.iter().map(|m| format!("{m} mn")).collect()
}

/// Recursive statement of the general search over countdown boards, in
/// minutes after the start. Returns each itinerary's departures.
fn reference_search(
    boards: &[Vec<u8>],
    durations: &[i64],
    floor: i64,
    margin: i64,
) -> Vec<Vec<i64>> {
    let mut found = Vec::new();
    let mut best: Option<i64> = None;
    let last_duration = durations[durations.len() - 1];

    for &departure in &boards[0] {
        let departure = i64::from(departure);
        if departure < floor {
            continue;
        }
        let arrival = departure + durations[0];
        if best.is_some_and(|b| arrival >= b + margin) {
            break;
        }
        if boards.len() == 1 {
            found.push(vec![departure]);
            continue;
        }
        for rest in reference_search(&boards[1..], &durations[1..], arrival, margin) {
            let end = rest[rest.len() - 1] + last_duration;
            match best {
                None => best = Some(end),
                Some(b) if end >= b + margin => break,
                Some(_) => {}
            }
            let mut trip = vec![departure];
            trip.extend(rest);
            found.push(trip);
        }
    }
    found
}

/// Departure offsets of each leg, in minutes after the start.
fn offsets(trip: &Trip) -> Vec<i64> {
    trip.legs()
        .iter()
        .map(|l| (l.departure_time().unwrap() - start()).num_minutes())
        .collect()
}

fn unsorted_board_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..90, 0..6)
}

proptest! {
    /// No itinerary arrives `margin` or more after the first one found.
    #[test]
    fn general_respects_margin(
        a in board_strategy(),
        b in board_strategy(),
        margin in 0i64..60,
    ) {
        let a = countdown_board(&a);
        let b = countdown_board(&b);
        let provider = StubProvider::new()
            .board("A", &a.iter().map(String::as_str).collect::<Vec<_>>())
            .board("B", &b.iter().map(String::as_str).collect::<Vec<_>>());
        let legs = two_legs();

        let outcome = run_general(&provider, &legs, margin);

        if let Some(first) = outcome.trips.first() {
            let bound = first.arrival_time() + Duration::minutes(margin);
            for trip in &outcome.trips[1..] {
                prop_assert!(trip.arrival_time() < bound);
            }
        }
    }

    /// Three-leg searches agree with the recursive formulation, including
    /// cuts made at the middle level.
    #[test]
    fn general_matches_recursive_search(
        boards in prop::collection::vec(unsorted_board_strategy(), 3),
        durations in prop::collection::vec(1i64..30, 3),
        margin in 0i64..60,
    ) {
        let messages: Vec<Vec<String>> = boards.iter().map(|b| countdown_board(b)).collect();
        let mut provider = StubProvider::new();
        for (line, board) in ["A", "B", "C"].into_iter().zip(&messages) {
            provider = provider.board(line, &board.iter().map(String::as_str).collect::<Vec<_>>());
        }
        let legs = vec![
            leg("A", "Home", "Hub", durations[0]),
            leg("B", "Hub", "Station", durations[1]),
            leg("C", "Station", "Work", durations[2]),
        ];

        let outcome = run_general(&provider, &legs, margin);

        let found: Vec<Vec<i64>> = outcome.trips.iter().map(offsets).collect();
        prop_assert_eq!(found, reference_search(&boards, &durations, 0, margin));
        prop_assert_eq!(outcome.failures, 0);
    }

    /// Every linear itinerary is complete and connects strictly.
    #[test]
    fn linear_trips_connect(a in board_strategy(), b in board_strategy()) {
        let a = countdown_board(&a);
        let b = countdown_board(&b);
        let provider = StubProvider::new()
            .board("A", &a.iter().map(String::as_str).collect::<Vec<_>>())
            .board("B", &b.iter().map(String::as_str).collect::<Vec<_>>());
        let legs = two_legs();

        let outcome = run_linear(&provider, &legs);

        prop_assert!(outcome.trips.len() <= a.len());
        for trip in &outcome.trips {
            prop_assert_eq!(trip.len(), 2);
            let legs = trip.legs();
            prop_assert!(legs[1].departure_time() > legs[0].arrival_time());
        }
    }
}
