//! Schedule message parsing.
//!
//! Real-time boards report each upcoming departure as free text, and the
//! encoding depends on the mode: buses and metros count down ("3 mn",
//! "A l'approche"), RER boards give a clock time or platform status
//! ("17:47 Voie 2", "Train à quai V.2"). Everything else on a board (service
//! alerts, "PAS DE SERVICE", rows of dots) is not a schedule.
//!
//! Parsing never fails. Unrecognised text yields `None` and callers drop it.

use chrono::{Duration, NaiveDateTime};

use crate::domain::{MessageStyle, on_service_day, parse_hhmm_prefix};

/// Countdown messages meaning "departing now".
const AT_STOP: &[&str] = &[
    "a l'arret",
    "a l'arrêt",
    "train a quai",
    "train à quai",
    "at stop",
    "stopped",
    "stopped at the stop",
];

/// Countdown messages meaning "about a minute away".
const APPROACHING: &[&str] = &[
    "a l'approche",
    "train a l'approche",
    "train à l'approche",
    "approaching",
];

/// Longest countdown accepted. Boards only announce the next few departures.
const MAX_COUNTDOWN_MINS: i64 = 24 * 60;

/// Countdown units accepted after the number of minutes.
const MINUTE_UNITS: &[&str] = &["mn", "min", "minute", "minutes"];

/// Clock-board prefixes meaning "at the platform now".
const AT_PLATFORM_PREFIXES: &[&str] = &["train à quai", "train a quai", "at platform"];

/// Clock-board prefixes meaning "arriving within the minute".
const APPROACHING_PREFIXES: &[&str] = &["a l'approche", "train a l'approche", "approaching"];

/// A departure as read from one board message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// Departs after waiting this long, counted from when the board was read.
    In(Duration),
    /// Departs at this instant.
    At(NaiveDateTime),
}

impl Departure {
    /// The absolute departure instant, given when the board was read.
    ///
    /// `None` if the instant falls outside the representable range.
    pub fn instant(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            Departure::In(wait) => now.checked_add_signed(wait),
            Departure::At(t) => Some(t),
        }
    }
}

/// Parse a board message according to the transport's message style.
pub fn parse_message(style: MessageStyle, msg: &str, now: NaiveDateTime) -> Option<Departure> {
    match style {
        MessageStyle::Countdown => parse_countdown(msg).map(Departure::In),
        MessageStyle::Clock => parse_clock(msg, now).map(Departure::At),
    }
}

/// Parse a countdown-style message into a waiting time.
///
/// Countdowns beyond a day are not schedules.
///
/// # Examples
///
/// ```
/// use itinerary_planner::schedule::parse_countdown;
/// use chrono::Duration;
///
/// assert_eq!(parse_countdown("3 mn"), Some(Duration::minutes(3)));
/// assert_eq!(parse_countdown("26 minutes"), Some(Duration::minutes(26)));
/// assert_eq!(parse_countdown("A l'arret"), Some(Duration::zero()));
/// assert_eq!(parse_countdown("A l'approche"), Some(Duration::minutes(1)));
/// assert_eq!(parse_countdown("PAS DE SERVICE"), None);
/// ```
pub fn parse_countdown(msg: &str) -> Option<Duration> {
    let normalized = msg.trim().to_lowercase();

    if AT_STOP.contains(&normalized.as_str()) {
        return Some(Duration::zero());
    }
    if APPROACHING.contains(&normalized.as_str()) {
        return Some(Duration::minutes(1));
    }

    let (count, unit) = normalized.split_once(' ')?;
    if !MINUTE_UNITS.contains(&unit.trim()) {
        return None;
    }
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let minutes: i64 = count.parse().ok()?;
    if minutes > MAX_COUNTDOWN_MINS {
        return None;
    }
    Duration::try_minutes(minutes)
}

/// Parse a clock-style message into a departure instant.
///
/// Platform and approach statuses are relative to `now`; a leading "HH:MM"
/// is placed on the service day around `now`, whatever text follows it.
pub fn parse_clock(msg: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let trimmed = msg.trim();
    let normalized = trimmed.to_lowercase();

    if AT_PLATFORM_PREFIXES
        .iter()
        .any(|p| normalized.starts_with(p))
    {
        return Some(now);
    }
    if APPROACHING_PREFIXES
        .iter()
        .any(|p| normalized.starts_with(p))
    {
        return now.checked_add_signed(Duration::minutes(1));
    }

    parse_hhmm_prefix(trimmed).map(|time| on_service_day(time, now))
}
