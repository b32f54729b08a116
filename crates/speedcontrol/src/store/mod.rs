//! Record persistence.
//!
//! [`RecordStore`] is the only surface callers depend on. Two backends
//! implement it: [`FileStore`], which keeps one CSV file per calendar day,
//! and [`MemoryStore`], which keeps the same partitions in memory.
//!
//! Both backends share the filtering and aggregation helpers in this module
//! so their query semantics cannot drift apart.

pub mod file;
pub mod memory;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::record::Record;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Slowest and fastest record of a day.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedExtremes {
    /// The record with the lowest speed (earliest one on ties).
    pub min: Record,
    /// The record with the highest speed (earliest one on ties).
    pub max: Record,
}

/// Storage capability required by callers.
///
/// Implementations must be safe to share between threads.
pub trait RecordStore: Send + Sync {
    /// Persist a record and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, record: &Record) -> Result<String>;

    /// Records of `day` whose speed is at least `threshold`, in insertion
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartitionNotFound`] if nothing was ever saved for
    /// `day`, or a storage error if the partition cannot be read.
    fn query_exceeding(&self, day: NaiveDate, threshold: f64) -> Result<Vec<Record>>;

    /// Slowest and fastest record of `day`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartitionNotFound`] if nothing was ever saved for
    /// `day`, [`Error::NoRecordsForDay`] if the partition holds no record of
    /// that day, or a storage error if the partition cannot be read.
    fn query_minmax(&self, day: NaiveDate) -> Result<SpeedExtremes>;
}

/// Keep the records of `day` with a speed of at least `threshold`.
///
/// The day check repeats what partitioning already guarantees; it guards
/// against rows that ended up in the wrong partition.
///
/// # Errors
///
/// Stops at and returns the first error produced by `records`.
pub fn filter_exceeding<I>(day: NaiveDate, threshold: f64, records: I) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut matched = Vec::new();
    for record in records {
        let record = record?;
        if record.day() == day && record.speed() >= threshold {
            matched.push(record);
        }
    }
    Ok(matched)
}

/// Find the slowest and fastest records of `day`.
///
/// # Errors
///
/// Returns the first error produced by `records`, or
/// [`Error::NoRecordsForDay`] if none of them belongs to `day`.
pub fn find_extremes<I>(day: NaiveDate, records: I) -> Result<SpeedExtremes>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut extremes = MinMax::default();
    for record in records {
        let record = record?;
        if record.day() == day {
            extremes.observe(record);
        }
    }
    extremes.finish().ok_or(Error::NoRecordsForDay { day })
}

/// Running minimum and maximum by speed.
#[derive(Debug, Default)]
struct MinMax {
    seen: Option<SpeedExtremes>,
}

impl MinMax {
    fn observe(&mut self, record: Record) {
        let Some(extremes) = self.seen.as_mut() else {
            self.seen = Some(SpeedExtremes {
                min: record.clone(),
                max: record,
            });
            return;
        };
        if record.speed() < extremes.min.speed() {
            extremes.min = record.clone();
        }
        if record.speed() > extremes.max.speed() {
            extremes.max = record;
        }
    }

    fn finish(self) -> Option<SpeedExtremes> {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_timestamp;

    fn record(datetime: &str, vehicle: &str, speed: f64) -> Record {
        Record::new(parse_timestamp(datetime).unwrap(), vehicle, speed).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn ok_all(records: &[Record]) -> Vec<Result<Record>> {
        records.iter().cloned().map(Ok).collect()
    }

    #[test]
    fn test_filter_exceeding_threshold_is_inclusive() {
        let records = vec![
            record("15.03.2024 08:00:00", "A", 99.9),
            record("15.03.2024 09:00:00", "B", 100.0),
            record("15.03.2024 10:00:00", "C", 150.0),
        ];
        let matched = filter_exceeding(day(), 100.0, ok_all(&records)).unwrap();

        let vehicles: Vec<_> = matched.iter().map(Record::vehicle_number).collect();
        assert_eq!(vehicles, vec!["B", "C"]);
    }

    #[test]
    fn test_filter_exceeding_skips_other_days() {
        let records = vec![
            record("14.03.2024 23:59:59", "A", 200.0),
            record("15.03.2024 00:00:00", "B", 200.0),
        ];
        let matched = filter_exceeding(day(), 0.0, ok_all(&records)).unwrap();

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].vehicle_number(), "B");
    }

    #[test]
    fn test_filter_exceeding_empty_is_ok() {
        let records = vec![record("15.03.2024 08:00:00", "A", 50.0)];
        let matched = filter_exceeding(day(), 60.0, ok_all(&records)).unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn test_filter_exceeding_propagates_errors() {
        let records = vec![
            Ok(record("15.03.2024 08:00:00", "A", 50.0)),
            Err(Error::NoRecordsForDay { day: day() }),
        ];
        assert!(filter_exceeding(day(), 0.0, records).is_err());
    }

    #[test]
    fn test_find_extremes() {
        let records = vec![
            record("15.03.2024 08:00:00", "A", 85.5),
            record("15.03.2024 09:00:00", "B", 120.0),
            record("15.03.2024 10:00:00", "C", 60.0),
        ];
        let extremes = find_extremes(day(), ok_all(&records)).unwrap();

        assert_eq!(extremes.min.vehicle_number(), "C");
        assert_eq!(extremes.max.vehicle_number(), "B");
    }

    #[test]
    fn test_find_extremes_ties_keep_earliest() {
        let records = vec![
            record("15.03.2024 08:00:00", "first", 70.0),
            record("15.03.2024 09:00:00", "second", 70.0),
        ];
        let extremes = find_extremes(day(), ok_all(&records)).unwrap();

        assert_eq!(extremes.min.vehicle_number(), "first");
        assert_eq!(extremes.max.vehicle_number(), "first");
    }

    #[test]
    fn test_find_extremes_single_record() {
        let records = vec![record("15.03.2024 08:00:00", "only", 0.0)];
        let extremes = find_extremes(day(), ok_all(&records)).unwrap();

        assert_eq!(extremes.min, records[0]);
        assert_eq!(extremes.max, records[0]);
    }

    #[test]
    fn test_find_extremes_no_matching_day() {
        let records = vec![record("16.03.2024 08:00:00", "A", 50.0)];
        let err = find_extremes(day(), ok_all(&records)).unwrap_err();
        assert!(matches!(err, Error::NoRecordsForDay { .. }));
    }
}
