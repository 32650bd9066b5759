//! Transport types: which route a leg rides and how its schedules read.

use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// How a transport kind's real-time board encodes departures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// Waiting times relative to the request ("3 mn", "A l'approche").
    Countdown,
    /// Clock times or platform status ("17:47 Voie 2", "Train à quai").
    Clock,
}

/// The kinds of transport the RATP API serves schedules for.
///
/// # Examples
///
/// ```
/// use itinerary_planner::domain::{MessageStyle, TransportKind};
///
/// let kind: TransportKind = "RER".parse().unwrap();
/// assert_eq!(kind, TransportKind::Rer);
/// assert_eq!(kind.message_style(), MessageStyle::Clock);
/// assert!(kind.filters_variants());
///
/// assert!("ferry".parse::<TransportKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Bus,
    Metro,
    Tramway,
    Noctilien,
    Rer,
}

impl TransportKind {
    /// Parse a kind name, case-insensitively, singular or plural.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_lowercase().as_str() {
            "bus" | "buses" => Ok(TransportKind::Bus),
            "metro" | "metros" => Ok(TransportKind::Metro),
            "tram" | "tramway" | "tramways" => Ok(TransportKind::Tramway),
            "noctilien" | "noctiliens" => Ok(TransportKind::Noctilien),
            "rer" | "rers" => Ok(TransportKind::Rer),
            _ => Err(DomainError::UnknownKind(s.to_string())),
        }
    }

    /// The path segment the API uses for this kind.
    pub fn api_name(&self) -> &'static str {
        match self {
            TransportKind::Bus => "buses",
            TransportKind::Metro => "metros",
            TransportKind::Tramway => "tramways",
            TransportKind::Noctilien => "noctiliens",
            TransportKind::Rer => "rers",
        }
    }

    /// How this kind's schedule messages are encoded.
    pub fn message_style(&self) -> MessageStyle {
        match self {
            TransportKind::Rer => MessageStyle::Clock,
            TransportKind::Bus
            | TransportKind::Metro
            | TransportKind::Tramway
            | TransportKind::Noctilien => MessageStyle::Countdown,
        }
    }

    /// Whether departures must be checked against the variant classifier.
    ///
    /// RER services run many missions on the same line, and not all of them
    /// stop everywhere.
    pub fn filters_variants(&self) -> bool {
        matches!(self, TransportKind::Rer)
    }
}

impl FromStr for TransportKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::Bus => "bus",
            TransportKind::Metro => "metro",
            TransportKind::Tramway => "tram",
            TransportKind::Noctilien => "noctilien",
            TransportKind::Rer => "RER",
        };
        f.write_str(name)
    }
}

/// Coarse travel direction along a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// "A" (aller).
    Outbound,
    /// "R" (retour).
    Return,
    /// "A+R", both directions on one board.
    Both,
}

impl Direction {
    /// Parse "A", "R" or "A+R" (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Direction::Outbound),
            "R" => Ok(Direction::Return),
            "A+R" => Ok(Direction::Both),
            _ => Err(DomainError::UnknownDirection(s.to_string())),
        }
    }

    /// The code the API uses for this direction.
    pub fn as_api(&self) -> &'static str {
        match self {
            Direction::Outbound => "A",
            Direction::Return => "R",
            Direction::Both => "A+R",
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api())
    }
}

/// A route to ride: kind, line, direction and optionally a variant.
///
/// The variant (RATP "mission" code, e.g. `KASE`) is only known once a
/// concrete departure has been picked from a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transport {
    pub kind: TransportKind,
    pub line: String,
    pub direction: Direction,
    pub variant: Option<String>,
}

impl Transport {
    /// Create a transport without a variant.
    pub fn new(kind: TransportKind, line: impl Into<String>, direction: Direction) -> Self {
        Self {
            kind,
            line: line.into(),
            direction,
            variant: None,
        }
    }

    /// Returns a copy of this transport refined to a specific variant.
    pub fn with_variant(&self, variant: Option<&str>) -> Self {
        Self {
            variant: variant.map(str::to_string),
            ..self.clone()
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.line, self.direction)?;
        if let Some(variant) = &self.variant {
            write!(f, " [{variant}]")?;
        }
        Ok(())
    }
}
