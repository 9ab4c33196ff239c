//! Observation Record
//!
//! One buoy measurement as published in the campaign table.
//!
//! ## Invariants
//! - Timestamp is a UTC instant built from `DD/MM/YYYY` + `HH:MM`
//! - Heights and period are finite and `>= 0`
//! - Temperature is finite and `>= -273.15`
//! - Directions are plain integers (degrees), no range check
//!
//! A record is either fully valid or not built at all.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Cells per table row
pub const CELLS_PER_ROW: usize = 8;

/// Column names in page order
pub const ROW_SCHEMA: [&str; CELLS_PER_ROW] = [
    "date",
    "time",
    "significant wave height",
    "max wave height",
    "significant period",
    "peak direction",
    "peak directional spread",
    "temperature",
];

/// Date and time cells are joined with a single space before parsing
///
/// chrono accepts single-digit fields here, so zero padding of the day,
/// month and minute is checked separately.
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Absolute zero in °C
pub const MIN_WATER_TEMPERATURE: f64 = -273.15;

// ============================================================================
// Error
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("expected 8 cells, got {0}")]
    CellCount(usize),

    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("invalid {column} {value:?}: not a number")]
    NotANumber { column: &'static str, value: String },

    #[error("invalid {column} {value:?}: not an integer")]
    NotAnInteger { column: &'static str, value: String },

    #[error("{column} must be >= {min}, got {value}")]
    OutOfRange {
        column: &'static str,
        min: f64,
        value: f64,
    },
}

// ============================================================================
// Record
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ObservationDocument", try_from = "ObservationDocument")]
pub struct ObservationRecord {
    timestamp: DateTime<Utc>,
    significant_wave_height: f64,
    max_wave_height: f64,
    significant_period: f64,
    peak_direction: i32,
    peak_directional_spread: i32,
    water_temperature: f64,
}

impl ObservationRecord {
    /// Build a record from typed values, enforcing the numeric bounds
    pub fn new(
        timestamp: DateTime<Utc>,
        significant_wave_height: f64,
        max_wave_height: f64,
        significant_period: f64,
        peak_direction: i32,
        peak_directional_spread: i32,
        water_temperature: f64,
    ) -> Result<Self, ObservationError> {
        check_min(ROW_SCHEMA[2], significant_wave_height, 0.0)?;
        check_min(ROW_SCHEMA[3], max_wave_height, 0.0)?;
        check_min(ROW_SCHEMA[4], significant_period, 0.0)?;
        check_min(ROW_SCHEMA[7], water_temperature, MIN_WATER_TEMPERATURE)?;

        Ok(Self {
            timestamp,
            significant_wave_height,
            max_wave_height,
            significant_period,
            peak_direction,
            peak_directional_spread,
            water_temperature,
        })
    }

    /// Build a record from the trimmed text of one table row
    ///
    /// Cells are read positionally following [`ROW_SCHEMA`].
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Result<Self, ObservationError> {
        let [date, time, h13, hmax, th13, direction, spread, temperature] = cells else {
            return Err(ObservationError::CellCount(cells.len()));
        };

        let timestamp = parse_timestamp(date.as_ref(), time.as_ref())?;

        Self::new(
            timestamp,
            parse_float(ROW_SCHEMA[2], h13.as_ref())?,
            parse_float(ROW_SCHEMA[3], hmax.as_ref())?,
            parse_float(ROW_SCHEMA[4], th13.as_ref())?,
            parse_int(ROW_SCHEMA[5], direction.as_ref())?,
            parse_int(ROW_SCHEMA[6], spread.as_ref())?,
            parse_float(ROW_SCHEMA[7], temperature.as_ref())?,
        )
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Average of the top third of wave heights (m)
    pub fn significant_wave_height(&self) -> f64 {
        self.significant_wave_height
    }

    pub fn max_wave_height(&self) -> f64 {
        self.max_wave_height
    }

    /// Average of the top third of wave periods (s)
    pub fn significant_period(&self) -> f64 {
        self.significant_period
    }

    /// Degrees clockwise from true north
    pub fn peak_direction(&self) -> i32 {
        self.peak_direction
    }

    pub fn peak_directional_spread(&self) -> i32 {
        self.peak_directional_spread
    }

    /// °C
    pub fn water_temperature(&self) -> f64 {
        self.water_temperature
    }

    /// Storage key: the RFC 3339 timestamp, so re-adding overwrites
    pub fn document_id(&self) -> String {
        format_timestamp(self.timestamp)
    }
}

// ============================================================================
// Canonical document
// ============================================================================

/// Storage form of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationDocument {
    pub timestamp: String,
    #[serde(rename = "h1_3")]
    pub significant_wave_height: f64,
    #[serde(rename = "hmax")]
    pub max_wave_height: f64,
    #[serde(rename = "th1_3")]
    pub significant_period: f64,
    pub peak_direction: i32,
    pub peak_directional_spread: i32,
    #[serde(rename = "temperature")]
    pub water_temperature: f64,
}

impl From<ObservationRecord> for ObservationDocument {
    fn from(record: ObservationRecord) -> Self {
        Self {
            timestamp: format_timestamp(record.timestamp),
            significant_wave_height: record.significant_wave_height,
            max_wave_height: record.max_wave_height,
            significant_period: record.significant_period,
            peak_direction: record.peak_direction,
            peak_directional_spread: record.peak_directional_spread,
            water_temperature: record.water_temperature,
        }
    }
}

impl TryFrom<ObservationDocument> for ObservationRecord {
    type Error = ObservationError;

    fn try_from(doc: ObservationDocument) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&doc.timestamp)
            .map_err(|e| ObservationError::Timestamp {
                value: doc.timestamp.clone(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        ObservationRecord::new(
            timestamp,
            doc.significant_wave_height,
            doc.max_wave_height,
            doc.significant_period,
            doc.peak_direction,
            doc.peak_directional_spread,
            doc.water_temperature,
        )
    }
}

/// `2024-09-17T09:00:00Z`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ============================================================================
// Cell parsers
// ============================================================================

fn parse_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, ObservationError> {
    let value = format!("{date} {time}");
    if !is_zero_padded(date, time) {
        return Err(ObservationError::Timestamp {
            value,
            reason: "expected DD/MM/YYYY and HH:MM".to_string(),
        });
    }
    NaiveDateTime::parse_from_str(&value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ObservationError::Timestamp {
            value,
            reason: e.to_string(),
        })
}

/// `DD/MM/YYYY` exactly, and a two-digit minute
fn is_zero_padded(date: &str, time: &str) -> bool {
    let date_ok = date.len() == 10
        && date.bytes().enumerate().all(|(i, b)| match i {
            2 | 5 => b == b'/',
            _ => b.is_ascii_digit(),
        });
    let minute_ok = time
        .split_once(':')
        .is_some_and(|(_, minute)| minute.len() == 2 && minute.bytes().all(|b| b.is_ascii_digit()));

    date_ok && minute_ok
}

fn parse_float(column: &'static str, text: &str) -> Result<f64, ObservationError> {
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ObservationError::NotANumber {
            column,
            value: text.to_string(),
        })
}

fn parse_int(column: &'static str, text: &str) -> Result<i32, ObservationError> {
    text.parse::<i32>()
        .map_err(|_| ObservationError::NotAnInteger {
            column,
            value: text.to_string(),
        })
}

fn check_min(column: &'static str, value: f64, min: f64) -> Result<(), ObservationError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ObservationError::OutOfRange { column, min, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SAMPLE_ROW: [&str; 8] = ["17/09/2024", "09:00", "0.6", "1.1", "4.7", "8", "32", "15"];

    fn with_cell(index: usize, value: &str) -> Vec<String> {
        let mut row: Vec<String> = SAMPLE_ROW.iter().map(|s| s.to_string()).collect();
        row[index] = value.to_string();
        row
    }

    #[test]
    fn test_from_cells_sample_row() {
        let record = ObservationRecord::from_cells(&SAMPLE_ROW).unwrap();

        assert_eq!(
            record.timestamp(),
            Utc.with_ymd_and_hms(2024, 9, 17, 9, 0, 0).unwrap()
        );
        assert_eq!(record.significant_wave_height(), 0.6);
        assert_eq!(record.max_wave_height(), 1.1);
        assert_eq!(record.significant_period(), 4.7);
        assert_eq!(record.peak_direction(), 8);
        assert_eq!(record.peak_directional_spread(), 32);
        assert_eq!(record.water_temperature(), 15.0);
        assert_eq!(record.document_id(), "2024-09-17T09:00:00Z");
    }

    #[test]
    fn test_from_cells_wrong_count() {
        assert_eq!(
            ObservationRecord::from_cells(&SAMPLE_ROW[..7]).unwrap_err(),
            ObservationError::CellCount(7)
        );
        let empty: [&str; 0] = [];
        assert_eq!(
            ObservationRecord::from_cells(&empty).unwrap_err(),
            ObservationError::CellCount(0)
        );
    }

    #[test]
    fn test_from_cells_bad_timestamp() {
        for (index, value) in [
            (0, "2024-09-17"),
            (0, "31/02/2024"),
            (0, "7/09/2024"),
            (0, "17/9/2024"),
            (0, "17/09/24"),
            (1, "9h00"),
            (1, "09:5"),
            (1, ""),
        ] {
            let err = ObservationRecord::from_cells(&with_cell(index, value)).unwrap_err();
            assert!(
                matches!(err, ObservationError::Timestamp { .. }),
                "{value:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn test_from_cells_single_digit_hour() {
        let record = ObservationRecord::from_cells(&with_cell(1, "9:00")).unwrap();
        assert_eq!(record.document_id(), "2024-09-17T09:00:00Z");
    }

    #[test]
    fn test_from_cells_non_numeric() {
        let err = ObservationRecord::from_cells(&with_cell(2, "abc")).unwrap_err();
        assert_eq!(
            err,
            ObservationError::NotANumber {
                column: "significant wave height",
                value: "abc".to_string()
            }
        );

        let err = ObservationRecord::from_cells(&with_cell(7, "NaN")).unwrap_err();
        assert!(matches!(err, ObservationError::NotANumber { column: "temperature", .. }));

        let err = ObservationRecord::from_cells(&with_cell(5, "8.5")).unwrap_err();
        assert!(matches!(err, ObservationError::NotAnInteger { column: "peak direction", .. }));
    }

    #[test]
    fn test_from_cells_bounds() {
        for index in [2, 3, 4] {
            let err = ObservationRecord::from_cells(&with_cell(index, "-0.1")).unwrap_err();
            assert!(matches!(err, ObservationError::OutOfRange { min, .. } if min == 0.0));
        }

        let err = ObservationRecord::from_cells(&with_cell(7, "-273.16")).unwrap_err();
        assert!(matches!(err, ObservationError::OutOfRange { column: "temperature", .. }));

        // Bounds are inclusive
        assert!(ObservationRecord::from_cells(&with_cell(2, "0")).is_ok());
        assert!(ObservationRecord::from_cells(&with_cell(7, "-273.15")).is_ok());
    }

    #[test]
    fn test_directions_are_not_range_checked() {
        let record = ObservationRecord::from_cells(&with_cell(5, "-720")).unwrap();
        assert_eq!(record.peak_direction(), -720);
    }

    #[test]
    fn test_document_shape() {
        let record = ObservationRecord::from_cells(&SAMPLE_ROW).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": "2024-09-17T09:00:00Z",
                "h1_3": 0.6,
                "hmax": 1.1,
                "th1_3": 4.7,
                "peak_direction": 8,
                "peak_directional_spread": 32,
                "temperature": 15.0
            })
        );

        let back: ObservationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_document_round_trip_generated_rows() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..20_000 {
            let row = [
                format!(
                    "{:02}/{:02}/{}",
                    rng.random_range(1..=28),
                    rng.random_range(1..=12),
                    rng.random_range(2000..=2030)
                ),
                format!("{:02}:{:02}", rng.random_range(0..24), rng.random_range(0..60)),
                format!("{}", rng.random_range(0.0..20.0_f64)),
                format!("{}", rng.random_range(0.0..30.0_f64)),
                format!("{}", rng.random_range(0.0..25.0_f64)),
                format!("{}", rng.random_range(0..360)),
                format!("{}", rng.random_range(0..90)),
                format!("{}", rng.random_range(-2.0..30.0_f64)),
            ];
            let record = ObservationRecord::from_cells(&row).unwrap();

            let json = serde_json::to_string(&record).unwrap();
            let back: ObservationRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(back, record, "row {row:?} changed through {json}");
        }
    }

    #[test]
    fn test_document_with_invalid_values_is_rejected() {
        let json = serde_json::json!({
            "timestamp": "2024-09-17T09:00:00Z",
            "h1_3": -1.0,
            "hmax": 1.1,
            "th1_3": 4.7,
            "peak_direction": 8,
            "peak_directional_spread": 32,
            "temperature": 15.0
        });
        assert!(serde_json::from_value::<ObservationRecord>(json).is_err());

        let json = serde_json::json!({
            "timestamp": "yesterday",
            "h1_3": 1.0,
            "hmax": 1.1,
            "th1_3": 4.7,
            "peak_direction": 8,
            "peak_directional_spread": 32,
            "temperature": 15.0
        });
        assert!(serde_json::from_value::<ObservationRecord>(json).is_err());
    }

    #[test]
    fn test_document_accepts_offset_timestamps() {
        let doc = ObservationDocument {
            timestamp: "2024-09-17T11:00:00+02:00".to_string(),
            significant_wave_height: 0.6,
            max_wave_height: 1.1,
            significant_period: 4.7,
            peak_direction: 8,
            peak_directional_spread: 32,
            water_temperature: 15.0,
        };
        let record = ObservationRecord::try_from(doc).unwrap();
        assert_eq!(record.document_id(), "2024-09-17T09:00:00Z");
    }
}
