//! Core record types for speedcontrol.
//!
//! A [`Record`] is one speed measurement: when it happened, which vehicle it
//! was and how fast the vehicle went. Records are validated once, at
//! construction, and carry a content-derived identity.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec;

/// Lowest accepted speed.
pub const MIN_SPEED: f64 = 0.0;

/// Highest accepted speed.
pub const MAX_SPEED: f64 = 400.0;

/// Earliest accepted timestamp, 2010-01-01T01:00:00Z, in Unix seconds.
const MIN_TIMESTAMP_SECS: i64 = 1_262_307_600;

/// Latest accepted timestamp, 2030-01-01T01:00:00Z, in Unix seconds.
const MAX_TIMESTAMP_SECS: i64 = 1_893_459_600;

/// Reasons a record can fail construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Speed is outside `[MIN_SPEED, MAX_SPEED]`.
    #[error("speed {speed} is outside 0..=400")]
    SpeedOutOfRange {
        /// The rejected speed.
        speed: f64,
    },

    /// Vehicle number is empty.
    #[error("vehicle number cannot be empty")]
    EmptyVehicleNumber,

    /// Timestamp is outside the accepted window.
    #[error("datetime {timestamp} cannot be before 2010-01-01 01:00:00 UTC or after 2030-01-01 01:00:00 UTC")]
    TimestampOutOfRange {
        /// The rejected timestamp.
        timestamp: DateTime<Utc>,
    },
}

/// A single speed measurement.
///
/// Fields are private: a `Record` can only be obtained through
/// [`Record::new`], which validates it, or by decoding a stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    timestamp: DateTime<Utc>,
    vehicle_number: String,
    speed: f64,
}

impl Record {
    /// Create a new record.
    ///
    /// Checks run in a fixed order (speed, then vehicle number, then
    /// timestamp) and the first failing check is reported. Sub-second
    /// precision is dropped from the timestamp.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first violated rule.
    pub fn new(
        timestamp: DateTime<Utc>,
        vehicle_number: impl Into<String>,
        speed: f64,
    ) -> Result<Self, ValidationError> {
        let vehicle_number = vehicle_number.into();

        // NaN fails both comparisons, so test for membership instead.
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ValidationError::SpeedOutOfRange { speed });
        }
        if vehicle_number.is_empty() {
            return Err(ValidationError::EmptyVehicleNumber);
        }
        let secs = timestamp.timestamp();
        let past_max = secs > MAX_TIMESTAMP_SECS
            || (secs == MAX_TIMESTAMP_SECS && timestamp.timestamp_subsec_nanos() > 0);
        if secs < MIN_TIMESTAMP_SECS || past_max {
            return Err(ValidationError::TimestampOutOfRange { timestamp });
        }

        let timestamp = timestamp.trunc_subsecs(0);
        let id = Self::compute_id(&timestamp, &vehicle_number, speed);
        Ok(Self {
            id,
            timestamp,
            vehicle_number,
            speed,
        })
    }

    /// Rebuild a record from stored fields without validating them.
    pub(crate) fn from_parts(
        id: String,
        timestamp: DateTime<Utc>,
        vehicle_number: String,
        speed: f64,
    ) -> Self {
        Self {
            id,
            timestamp,
            vehicle_number,
            speed,
        }
    }

    /// Compute the identity of a measurement.
    ///
    /// BLAKE3 over `"<rfc3339 timestamp> <vehicle number> <speed>"`,
    /// hex-encoded.
    #[must_use]
    pub fn compute_id(timestamp: &DateTime<Utc>, vehicle_number: &str, speed: f64) -> String {
        let canonical = format!("{} {vehicle_number} {speed}", timestamp.to_rfc3339());
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }

    /// The record's identity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the measurement was taken.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The measured vehicle.
    #[must_use]
    pub fn vehicle_number(&self) -> &str {
        &self.vehicle_number
    }

    /// The measured speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The UTC calendar day of the measurement.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Render the record the way callers see it.
    #[must_use]
    pub fn view(&self) -> RecordView {
        RecordView {
            datetime: codec::format_timestamp(&self.timestamp),
            vehicle_number: self.vehicle_number.clone(),
            speed: self.speed.to_string(),
        }
    }
}

/// Caller-facing rendering of a record: a flat string-keyed map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    /// Timestamp in `DD.MM.YYYY HH:MM:SS` form.
    pub datetime: String,
    /// The measured vehicle.
    pub vehicle_number: String,
    /// The measured speed.
    pub speed: String,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        record.view()
    }
}
