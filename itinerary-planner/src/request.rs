//! Trip request files.
//!
//! A request lists the legs to ride, in order, and optionally the cutoff
//! margin for the general search:
//!
//! ```json
//! {
//!   "legs": [
//!     {"kind": "bus", "line": "172", "from": "Villejuif - Louis Aragon",
//!      "to": "Bourg la Reine", "direction": "R", "duration_mins": 20},
//!     {"kind": "rer", "line": "B", "from": "Bourg la Reine",
//!      "to": "Massy Verrieres", "direction": "R", "duration_mins": 12}
//!   ],
//!   "margin_mins": 31
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

use crate::domain::{Direction, DomainError, Leg, Transport, TransportKind};

/// Errors from loading a trip request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The request file could not be read
    #[error("failed to read trip request {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request is not valid JSON for a trip request
    #[error("invalid trip request: {0}")]
    Json(#[from] serde_json::Error),

    /// A leg names an unknown kind or direction
    #[error("invalid leg: {0}")]
    Invalid(#[from] DomainError),

    /// The request lists no legs
    #[error("trip request has no legs")]
    NoLegs,

    /// A leg's duration is not positive, or too large to represent
    #[error("leg {index} has invalid duration {mins} min")]
    InvalidDuration { index: usize, mins: i64 },
}

/// One leg as written in a request file.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestedLeg {
    pub kind: String,
    pub line: String,
    pub from: String,
    pub to: String,
    pub direction: String,
    pub duration_mins: i64,
}

/// A trip request as written in a request file.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    pub legs: Vec<RequestedLeg>,
    #[serde(default)]
    pub margin_mins: Option<i64>,
}

impl TripRequest {
    /// Load a request from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RequestError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| RequestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse a request from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the request and build the requested legs.
    pub fn legs(&self) -> Result<Vec<Leg>, RequestError> {
        if self.legs.is_empty() {
            return Err(RequestError::NoLegs);
        }

        self.legs
            .iter()
            .enumerate()
            .map(|(index, leg)| leg.to_leg(index))
            .collect()
    }
}

impl RequestedLeg {
    fn to_leg(&self, index: usize) -> Result<Leg, RequestError> {
        let invalid = || RequestError::InvalidDuration {
            index,
            mins: self.duration_mins,
        };
        if self.duration_mins <= 0 {
            return Err(invalid());
        }
        let duration = Duration::try_minutes(self.duration_mins).ok_or_else(invalid)?;

        let kind = TransportKind::parse(&self.kind)?;
        let direction = Direction::parse(&self.direction)?;
        let transport = Transport::new(kind, self.line.trim(), direction);

        Ok(Leg::requested(
            transport,
            self.from.trim(),
            self.to.trim(),
            duration,
        ))
    }
}
