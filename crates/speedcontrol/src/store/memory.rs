//! In-memory record store.
//!
//! Keeps the same day partitions as [`FileStore`](super::FileStore) in a map.
//! Nothing survives the process; it exists so callers of [`RecordStore`] can
//! be exercised without touching the filesystem.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::store::{filter_exceeding, find_extremes, RecordStore, SpeedExtremes};

/// Record store holding its partitions in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: RwLock<BTreeMap<NaiveDate, Vec<Record>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.read().values().map(Vec::len).sum()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.read().is_empty()
    }

    /// Copy out the partition for `day`.
    fn partition(&self, day: NaiveDate) -> Result<Vec<Record>> {
        self.partitions
            .read()
            .get(&day)
            .cloned()
            .ok_or(Error::PartitionNotFound { day })
    }
}

impl RecordStore for MemoryStore {
    fn save(&self, record: &Record) -> Result<String> {
        self.partitions
            .write()
            .entry(record.day())
            .or_default()
            .push(record.clone());

        debug!("Saved record {} in memory", record.id());
        Ok(record.id().to_string())
    }

    fn query_exceeding(&self, day: NaiveDate, threshold: f64) -> Result<Vec<Record>> {
        filter_exceeding(day, threshold, self.partition(day)?.into_iter().map(Ok))
    }

    fn query_minmax(&self, day: NaiveDate) -> Result<SpeedExtremes> {
        find_extremes(day, self.partition(day)?.into_iter().map(Ok))
    }
}
