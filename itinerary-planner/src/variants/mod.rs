//! Route variant classification.
//!
//! An RER line runs many missions (variants), and a departure from the right
//! platform may still skip the station the traveler needs. This module
//! answers "does mission X stop at station Y?" and remembers each mission's
//! station list on disk, since the list for a mission code does not change.

mod classifier;
mod error;
mod store;

pub use classifier::VariantClassifier;
pub use error::StoreError;
pub use store::{JsonFileStore, MemoryStore, VariantRecords, VariantStore};
