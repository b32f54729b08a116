//! Row encoding for stored records.
//!
//! A row is the fixed four-field tuple `[id, timestamp, vehicle_number, speed]`
//! written as one CSV line. This module also owns the canonical text formats
//! for timestamps, request dates and partition day keys.

use std::num::ParseFloatError;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::StringRecord;
use thiserror::Error;

use crate::record::Record;

/// Number of fields in a stored row.
pub const ROW_FIELDS: usize = 4;

/// Canonical timestamp format, `DD.MM.YYYY HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Canonical date format used by queries, `DD.MM.YYYY`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Format of a partition's day key, `DD_MM_YYYY`.
pub const DAY_KEY_FORMAT: &str = "%d_%m_%Y";

/// One encoded record: `[id, timestamp, vehicle_number, speed]`.
pub type Row = [String; ROW_FIELDS];

/// Reasons a stored row can fail to decode.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The row does not have exactly [`ROW_FIELDS`] fields.
    #[error("expected 4 fields, found {found}")]
    FieldCount {
        /// Number of fields actually present.
        found: usize,
    },

    /// The timestamp field does not match [`TIMESTAMP_FORMAT`].
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        /// The offending field.
        value: String,
        /// The parse failure.
        #[source]
        source: TimeTextError,
    },

    /// The speed field is not a floating-point number.
    #[error("invalid speed '{value}': {source}")]
    Speed {
        /// The offending field.
        value: String,
        /// The parse failure.
        #[source]
        source: ParseFloatError,
    },

    /// The line is not valid delimited text.
    #[error("{0}")]
    Syntax(String),
}

/// Reasons timestamp or date text is rejected.
#[derive(Debug, Error)]
pub enum TimeTextError {
    /// The text does not parse against the format at all.
    #[error(transparent)]
    Parse(#[from] chrono::ParseError),

    /// The text parses but is not in canonical zero-padded form.
    #[error("not in canonical form {expected}")]
    NotCanonical {
        /// The canonical form, for the message.
        expected: &'static str,
    },
}

/// Encode a record as a row.
#[must_use]
pub fn encode(record: &Record) -> Row {
    [
        record.id().to_string(),
        format_timestamp(&record.timestamp()),
        record.vehicle_number().to_string(),
        record.speed().to_string(),
    ]
}

/// Encode a record as one complete CSV line, terminator included.
///
/// # Errors
///
/// Returns an error if the csv writer fails, which only happens on I/O
/// failure of the in-memory buffer.
pub fn encode_line(record: &Record) -> std::io::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(encode(record))?;
    writer
        .into_inner()
        .map_err(|err| std::io::Error::new(err.error().kind(), err.error().to_string()))
}

/// Decode a row into a record.
///
/// Only syntax is checked here; range rules were enforced when the record
/// was first constructed.
///
/// # Errors
///
/// Returns a [`FormatError`] if the timestamp or speed field does not parse.
pub fn decode(row: &Row) -> Result<Record, FormatError> {
    let [id, timestamp, vehicle_number, speed] = row;
    decode_parts(id, timestamp, vehicle_number, speed)
}

/// Decode a row read from a partition file.
///
/// # Errors
///
/// Returns a [`FormatError`] if the field count is not [`ROW_FIELDS`] or a
/// field does not parse.
pub fn decode_fields(fields: &StringRecord) -> Result<Record, FormatError> {
    if fields.len() != ROW_FIELDS {
        return Err(FormatError::FieldCount {
            found: fields.len(),
        });
    }
    decode_parts(&fields[0], &fields[1], &fields[2], &fields[3])
}

fn decode_parts(
    id: &str,
    timestamp: &str,
    vehicle_number: &str,
    speed: &str,
) -> Result<Record, FormatError> {
    let parsed_timestamp = parse_timestamp(timestamp).map_err(|source| FormatError::Timestamp {
        value: timestamp.to_string(),
        source,
    })?;
    let parsed_speed = speed.parse::<f64>().map_err(|source| FormatError::Speed {
        value: speed.to_string(),
        source,
    })?;

    Ok(Record::from_parts(
        id.to_string(),
        parsed_timestamp,
        vehicle_number.to_string(),
        parsed_speed,
    ))
}

/// Render a timestamp in [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a UTC timestamp in [`TIMESTAMP_FORMAT`].
///
/// Only the exact fixed-width form is accepted: `5.3.2024 8:30:00` and
/// `15.03.202408:30:00` are rejected even though chrono alone takes them.
///
/// # Errors
///
/// Returns an error if the text does not parse or is not canonical.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, TimeTextError> {
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)?;
    let timestamp = Utc.from_utc_datetime(&naive);
    if format_timestamp(&timestamp) != text {
        return Err(TimeTextError::NotCanonical {
            expected: "DD.MM.YYYY HH:MM:SS",
        });
    }
    Ok(timestamp)
}

/// Parse a date in [`DATE_FORMAT`], fixed-width only.
///
/// # Errors
///
/// Returns an error if the text does not parse or is not canonical.
pub fn parse_date(text: &str) -> Result<NaiveDate, TimeTextError> {
    let day = NaiveDate::parse_from_str(text, DATE_FORMAT)?;
    if day.format(DATE_FORMAT).to_string() != text {
        return Err(TimeTextError::NotCanonical {
            expected: "DD.MM.YYYY",
        });
    }
    Ok(day)
}

/// The partition day key for a date.
#[must_use]
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Record {
        let timestamp = parse_timestamp("15.03.2024 08:30:00").unwrap();
        Record::new(timestamp, "AB123CD", 85.5).unwrap()
    }

    fn row(fields: [&str; ROW_FIELDS]) -> Row {
        fields.map(str::to_string)
    }

    #[test]
    fn test_encode_field_order() {
        let record = sample();
        let encoded = encode(&record);

        assert_eq!(encoded[0], record.id());
        assert_eq!(encoded[1], "15.03.2024 08:30:00");
        assert_eq!(encoded[2], "AB123CD");
        assert_eq!(encoded[3], "85.5");
    }

    #[test]
    fn test_decode_encoded_record() {
        let record = sample();
        let decoded = decode(&encode(&record)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_does_not_validate_ranges() {
        let decoded = decode(&row(["abc", "01.01.1999 00:00:00", "", "999.5"])).unwrap();
        assert_eq!(decoded.id(), "abc");
        assert_eq!(decoded.vehicle_number(), "");
        assert!((decoded.speed() - 999.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decode_bad_timestamp() {
        let err = decode(&row(["id", "2024-03-15 08:30:00", "X", "10"])).unwrap_err();
        assert!(matches!(err, FormatError::Timestamp { .. }));
    }

    #[test]
    fn test_decode_bad_speed() {
        let err = decode(&row(["id", "15.03.2024 08:30:00", "X", "fast"])).unwrap_err();
        assert!(matches!(err, FormatError::Speed { .. }));
    }

    #[test]
    fn test_decode_fields_wrong_count() {
        let fields = StringRecord::from(vec!["id", "15.03.2024 08:30:00", "X"]);
        let err = decode_fields(&fields).unwrap_err();
        assert!(matches!(err, FormatError::FieldCount { found: 3 }));

        let fields = StringRecord::from(vec!["id", "15.03.2024 08:30:00", "X", "1", "extra"]);
        let err = decode_fields(&fields).unwrap_err();
        assert!(matches!(err, FormatError::FieldCount { found: 5 }));
    }

    #[test]
    fn test_encode_line_quotes_delimiters() {
        let timestamp = parse_timestamp("15.03.2024 08:30:00").unwrap();
        let record = Record::new(timestamp, "AB,\"12\"", 10.0).unwrap();
        let line = String::from_utf8(encode_line(&record).unwrap()).unwrap();

        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("\"AB,\"\"12\"\"\""));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(line.as_bytes());
        let fields = reader.records().next().unwrap().unwrap();
        assert_eq!(decode_fields(&fields).unwrap(), record);
    }

    #[test]
    fn test_day_key() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(day_key(day), "05_03_2024");
    }

    #[test]
    fn test_parse_date() {
        let day = parse_date("15.03.2024").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(parse_date("2024-03-15").is_err());
    }

    #[test]
    fn test_parse_rejects_unpadded_and_unspaced_text() {
        for text in ["5.3.2024 8:30:00", "15.03.202408:30:00", "15.03.2024 8:30:00"] {
            let err = parse_timestamp(text).unwrap_err();
            assert!(matches!(err, TimeTextError::NotCanonical { .. }), "{text}");
        }
        assert!(matches!(
            parse_date("5.3.2024").unwrap_err(),
            TimeTextError::NotCanonical { .. }
        ));
        assert!(matches!(
            parse_date("15.3.2024").unwrap_err(),
            TimeTextError::NotCanonical { .. }
        ));
    }

    #[test]
    fn test_decode_rejects_non_canonical_timestamp() {
        for text in ["5.3.2024 8:30:00", "15.03.202408:30:00"] {
            let err = decode(&row(["id", text, "X", "10"])).unwrap_err();
            match err {
                FormatError::Timestamp { value, source } => {
                    assert_eq!(value, text);
                    assert!(matches!(source, TimeTextError::NotCanonical { .. }));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_format_error_display() {
        let err = FormatError::FieldCount { found: 2 };
        assert_eq!(err.to_string(), "expected 4 fields, found 2");
    }

    proptest! {
        #[test]
        fn prop_line_decodes_to_same_record(
            secs in 1_262_307_600_i64..=1_893_459_600_i64,
            vehicle in "[A-Z0-9 ,\"]{1,12}",
            speed in 0.0_f64..=400.0,
        ) {
            let timestamp = DateTime::from_timestamp(secs, 0).unwrap();
            let record = Record::new(timestamp, vehicle, speed).unwrap();

            let line = encode_line(&record).unwrap();
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .from_reader(line.as_slice());
            let fields = reader.records().next().unwrap().unwrap();

            prop_assert_eq!(decode_fields(&fields).unwrap(), record);
        }
    }
}
