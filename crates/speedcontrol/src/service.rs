//! Request handling in front of the record store.
//!
//! [`SpeedControl`] turns caller requests (text dates, vehicle numbers and
//! speeds) into store operations, gates them on a daily availability window
//! and renders the results as [`RecordView`]s.

use chrono::{Local, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::codec;
use crate::error::{Error, Result};
use crate::record::{Record, RecordView};
use crate::store::RecordStore;

/// Format of availability window bounds, `HH:MM`.
pub const WINDOW_TIME_FORMAT: &str = "%H:%M";

/// Daily time span during which requests are served.
///
/// Both bounds are inclusive and compared at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl AvailabilityWindow {
    /// Create a window from `start` to `end`.
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// A window covering every minute of the day.
    #[must_use]
    pub fn always() -> Self {
        Self {
            start: NaiveTime::default(),
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default(),
        }
    }

    /// Start of the window.
    #[must_use]
    pub fn start(&self) -> NaiveTime {
        self.start
    }

    /// End of the window.
    #[must_use]
    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Check if `now` falls inside the window.
    #[must_use]
    pub fn is_open_at(&self, now: NaiveTime) -> bool {
        let now = minutes_of_day(now);
        minutes_of_day(self.start) <= now && now <= minutes_of_day(self.end)
    }
}

impl Default for AvailabilityWindow {
    fn default() -> Self {
        Self::always()
    }
}

fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Request to record one measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    /// Measurement time, `DD.MM.YYYY HH:MM:SS` (UTC).
    pub datetime: String,
    /// The measured vehicle.
    pub vehicle_number: String,
    /// The measured speed; a JSON number or numeric string.
    #[serde(deserialize_with = "number_or_text")]
    pub speed: f64,
}

/// Request for the vehicles at or above a speed on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceedingSpeedRequest {
    /// The day, `DD.MM.YYYY`.
    pub date: String,
    /// Speed threshold; a JSON number or numeric string.
    #[serde(deserialize_with = "number_or_text")]
    pub speed: f64,
}

/// Request for the slowest and fastest measurement of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxRequest {
    /// The day, `DD.MM.YYYY`.
    pub date: String,
}

fn number_or_text<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Service facade over a [`RecordStore`].
#[derive(Debug)]
pub struct SpeedControl<S> {
    store: S,
    window: AvailabilityWindow,
}

impl<S: RecordStore> SpeedControl<S> {
    /// Create a service over `store`, open during `window`.
    pub fn new(store: S, window: AvailabilityWindow) -> Self {
        Self { store, window }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the availability window.
    pub fn window(&self) -> AvailabilityWindow {
        self.window
    }

    /// Validate and save a measurement, returning the record id.
    ///
    /// # Errors
    ///
    /// Returns an error outside the availability window, for unparseable or
    /// invalid input, or if the store fails.
    pub fn create_record(&self, request: &CreateRecordRequest) -> Result<String> {
        self.create_record_at(request, Local::now().time())
    }

    /// [`create_record`](Self::create_record) as if called at `now`.
    ///
    /// # Errors
    ///
    /// See [`create_record`](Self::create_record).
    pub fn create_record_at(
        &self,
        request: &CreateRecordRequest,
        now: NaiveTime,
    ) -> Result<String> {
        self.ensure_open(now)?;

        let timestamp = codec::parse_timestamp(&request.datetime)
            .map_err(|err| reject(Error::invalid_input("datetime", err.to_string())))?;
        let record = Record::new(timestamp, request.vehicle_number.as_str(), request.speed)
            .map_err(|err| reject(err.into()))?;

        let id = self.store.save(&record)?;
        info!("Saved record with id {}", id);
        Ok(id)
    }

    /// Vehicles at or above the requested speed on the requested day.
    ///
    /// # Errors
    ///
    /// Returns an error outside the availability window, for an
    /// unparseable date, or if the store query fails.
    pub fn exceeding_speed(&self, request: &ExceedingSpeedRequest) -> Result<Vec<RecordView>> {
        self.exceeding_speed_at(request, Local::now().time())
    }

    /// [`exceeding_speed`](Self::exceeding_speed) as if called at `now`.
    ///
    /// # Errors
    ///
    /// See [`exceeding_speed`](Self::exceeding_speed).
    pub fn exceeding_speed_at(
        &self,
        request: &ExceedingSpeedRequest,
        now: NaiveTime,
    ) -> Result<Vec<RecordView>> {
        self.ensure_open(now)?;

        let day = parse_day(&request.date)?;
        let records = self.store.query_exceeding(day, request.speed)?;
        info!(
            "Found {} vehicles at or above {} on {}",
            records.len(),
            request.speed,
            day
        );
        Ok(records.iter().map(Record::view).collect())
    }

    /// Slowest and fastest measurement of the requested day, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error outside the availability window, for an
    /// unparseable date, or if the store query fails.
    pub fn min_max_speed(&self, request: &MinMaxRequest) -> Result<[RecordView; 2]> {
        self.min_max_speed_at(request, Local::now().time())
    }

    /// [`min_max_speed`](Self::min_max_speed) as if called at `now`.
    ///
    /// # Errors
    ///
    /// See [`min_max_speed`](Self::min_max_speed).
    pub fn min_max_speed_at(
        &self,
        request: &MinMaxRequest,
        now: NaiveTime,
    ) -> Result<[RecordView; 2]> {
        self.ensure_open(now)?;

        let day = parse_day(&request.date)?;
        let extremes = self.store.query_minmax(day)?;
        info!(
            "Speed range on {}: {} to {}",
            day,
            extremes.min.speed(),
            extremes.max.speed()
        );
        Ok([extremes.min.view(), extremes.max.view()])
    }

    fn ensure_open(&self, now: NaiveTime) -> Result<()> {
        if self.window.is_open_at(now) {
            return Ok(());
        }
        warn!("Request at {} outside availability window", now.format(WINDOW_TIME_FORMAT));
        Err(Error::Unavailable {
            start: self.window.start.format(WINDOW_TIME_FORMAT).to_string(),
            end: self.window.end.format(WINDOW_TIME_FORMAT).to_string(),
        })
    }
}

fn parse_day(text: &str) -> Result<chrono::NaiveDate> {
    codec::parse_date(text).map_err(|err| reject(Error::invalid_input("date", err.to_string())))
}

fn reject(err: Error) -> Error {
    warn!("Rejected request: {}", err);
    err
}
