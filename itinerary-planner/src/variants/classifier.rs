//! Variant classification with a read-through persistent cache.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::ratp::ScheduleProvider;

use super::error::StoreError;
use super::store::{VariantRecords, VariantStore};

/// Decides whether a line variant serves a station.
///
/// Records are loaded from the store once, when the classifier is opened.
/// A code seen for the first time is looked up with the provider, and the
/// whole store is written back immediately, so each code costs at most one
/// fetch and one write across runs.
///
/// The record map stays locked across fetch-and-save, which makes the
/// read-modify-write cycle atomic within a process.
pub struct VariantClassifier {
    store: Box<dyn VariantStore>,
    records: Mutex<VariantRecords>,
}

impl VariantClassifier {
    /// Open a classifier over a store, loading its records.
    pub fn open(store: impl VariantStore + 'static) -> Result<Self, StoreError> {
        let records = store.load()?;
        debug!(records = records.len(), "Loaded variant store");
        Ok(Self {
            store: Box::new(store),
            records: Mutex::new(records),
        })
    }

    /// Returns whether variant `code` of `line` stops at `station`.
    ///
    /// Lookup failures never propagate: a variant the provider rejects as a
    /// bad request is recorded as serving nothing, and any other failure is
    /// logged and answered with `false` without being recorded, so the next
    /// call retries.
    pub fn classifies<P: ScheduleProvider + ?Sized>(
        &self,
        provider: &P,
        line: &str,
        code: &str,
        station: &str,
    ) -> bool {
        let mut records = self.lock();

        if let Some(stations) = records.get(code) {
            return serves(stations, station);
        }

        let stations = match provider.fetch_variant_stations(line, code) {
            Ok(stations) => dedup_in_order(stations),
            Err(e) if e.is_bad_request() => {
                debug!(code, error = %e, "Variant rejected by provider, recording as out of service");
                Vec::new()
            }
            Err(e) => {
                warn!(code, line, error = %e, "Failed to look up variant stations");
                return false;
            }
        };

        let answer = serves(&stations, station);
        info!(code, stations = stations.len(), "Updating variant store");
        records.insert(code.to_string(), stations);

        if let Err(e) = self.store.save(&records) {
            warn!(code, error = %e, "Failed to persist variant store");
        }

        answer
    }

    /// Stations recorded for a code, if it has been classified before.
    pub fn stations(&self, code: &str) -> Option<Vec<String>> {
        self.lock().get(code).cloned()
    }

    /// Number of recorded variants.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no variant has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VariantRecords> {
        // The map is only ever extended, so a poisoned guard is still usable
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn serves(stations: &[String], station: &str) -> bool {
    stations.iter().any(|s| s == station)
}

fn dedup_in_order(stations: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    stations
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
