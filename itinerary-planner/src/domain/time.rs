//! Wall-clock handling for real-time schedules.
//!
//! The RATP API reports departures either as a countdown relative to the
//! moment of the request or as a bare "HH:MM" clock time. Both are turned
//! into `NaiveDateTime` values in the traveler's local time. This module holds
//! the clock abstraction used to read "now" and the helpers that attach a
//! date to a bare clock time.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime, Timelike};

/// Threshold for detecting midnight rollover of a bare clock time.
///
/// A clock time more than 6 hours before "now" is taken to be tomorrow's.
const ROLLOVER_THRESHOLD_HOURS: i64 = 6;

/// Source of the current instant.
///
/// Real-time countdowns ("8 mn") only make sense relative to the moment the
/// board was read, so everything that converts them goes through a `Clock`.
pub trait Clock {
    /// Returns the current local time.
    fn now(&self) -> NaiveDateTime;
}

/// The system wall clock, in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Parse a leading `H:MM` or `HH:MM` clock time.
///
/// The time must be followed by the end of the input or by whitespace, so
/// `"17:47 Voie 2"` parses while `"17:470"` does not.
///
/// # Examples
///
/// ```
/// use itinerary_planner::domain::parse_hhmm_prefix;
/// use chrono::NaiveTime;
///
/// assert_eq!(
///     parse_hhmm_prefix("17:47 Voie 2"),
///     NaiveTime::from_hms_opt(17, 47, 0)
/// );
/// assert_eq!(parse_hhmm_prefix("9:05"), NaiveTime::from_hms_opt(9, 5, 0));
/// assert_eq!(parse_hhmm_prefix("25:00"), None);
/// assert_eq!(parse_hhmm_prefix("Train à quai"), None);
/// ```
pub fn parse_hhmm_prefix(s: &str) -> Option<NaiveTime> {
    let (hour_str, rest) = s.split_once(':')?;
    if hour_str.is_empty() || hour_str.len() > 2 {
        return None;
    }
    let hour = parse_digits(hour_str.as_bytes())?;

    let minute_bytes = rest.as_bytes().get(..2)?;
    let minute = parse_digits(minute_bytes)?;

    // Whatever follows the minutes must be a separator, not more digits.
    if let Some(next) = rest[2..].chars().next()
        && !next.is_whitespace()
    {
        return None;
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Attach a date to a bare clock time, relative to `now`.
///
/// The result is on `now`'s date unless that would put it more than six
/// hours in the past, in which case it has rolled over to the next day
/// (a 00:10 departure read at 23:55).
pub fn on_service_day(time: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if today < now - Duration::hours(ROLLOVER_THRESHOLD_HOURS) {
        return now
            .date()
            .succ_opt()
            .map(|tomorrow| tomorrow.and_time(time))
            .unwrap_or(today);
    }
    today
}

/// Format the hour and minute of an instant as "HH:MM".
pub fn format_hhmm(t: NaiveDateTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Parse one or two ASCII digit bytes into a u32.
fn parse_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 2 {
        return None;
    }
    bytes.iter().try_fold(0u32, |acc, &b| {
        let d = (b as char).to_digit(10)?;
        Some(acc * 10 + d)
    })
}
