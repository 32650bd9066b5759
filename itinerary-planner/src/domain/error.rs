//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from provider and IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Transport kind name not recognised
    #[error("unknown transport kind: {0}")]
    UnknownKind(String),

    /// Direction code not recognised
    #[error("unknown direction: {0} (expected A, R or A+R)")]
    UnknownDirection(String),

    /// Trip has no legs
    #[error("trip must have at least one leg")]
    EmptyTrip,

    /// A trip leg has no schedule attached
    #[error("leg {0} has no resolved times")]
    UnresolvedLeg(usize),

    /// A leg departs before the previous one arrives
    #[error("leg {index} departs at {departs} before the previous leg arrives at {arrives}")]
    OutOfOrder {
        index: usize,
        departs: String,
        arrives: String,
    },
}
