//! Data Logging
//!
//! Loads the speed/RPM time series recorded during a pull.

mod format;
mod reader;

pub use format::Delimiter;
pub use reader::{load, load_default, parse};

use serde::{Deserialize, Serialize};

/// Time column written by the scanner export
pub const DEFAULT_TIME_COLUMN: &str = "TIME";
/// Vehicle speed column (km/h) written by the scanner export
pub const DEFAULT_SPEED_COLUMN: &str = "Скорость автомобиля";
/// Engine speed column (rpm) written by the scanner export
pub const DEFAULT_RPM_COLUMN: &str = "Число оборотов коленвала";

/// Header names of the three required channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Time in seconds
    pub time: String,
    /// Vehicle speed in km/h
    pub speed: String,
    /// Engine speed in rpm
    pub rpm: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            time: DEFAULT_TIME_COLUMN.to_string(),
            speed: DEFAULT_SPEED_COLUMN.to_string(),
            rpm: DEFAULT_RPM_COLUMN.to_string(),
        }
    }
}

impl ColumnMap {
    /// Build a map from explicit header names
    pub fn new(time: impl Into<String>, speed: impl Into<String>, rpm: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            speed: speed.into(),
            rpm: rpm.into(),
        }
    }
}

/// A single log row; `None` marks a cell that was empty or not numeric
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawRecord {
    /// Seconds since the start of the log
    pub time: Option<f64>,
    /// Vehicle speed (km/h)
    pub speed_kmh: Option<f64>,
    /// Engine speed (rpm)
    pub rpm: Option<f64>,
}

impl RawRecord {
    /// Create a fully populated record
    pub fn new(time: f64, speed_kmh: f64, rpm: f64) -> Self {
        Self {
            time: Some(time),
            speed_kmh: Some(speed_kmh),
            rpm: Some(rpm),
        }
    }

    /// Whether any cell failed numeric coercion
    pub fn has_missing(&self) -> bool {
        self.time.is_none() || self.speed_kmh.is_none() || self.rpm.is_none()
    }
}

/// A loaded log: rows in file order plus what the header contained
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    records: Vec<RawRecord>,
    headers: Vec<String>,
    delimiter: Delimiter,
}

impl RawTable {
    /// Build a table from records already in memory
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            headers: Vec::new(),
            delimiter: Delimiter::Comma,
        }
    }

    pub(crate) fn with_source(
        records: Vec<RawRecord>,
        headers: Vec<String>,
        delimiter: Delimiter,
    ) -> Self {
        Self {
            records,
            headers,
            delimiter,
        }
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get all rows
    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// Header names found in the source file
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Delimiter the file was read with
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Number of rows with at least one missing cell
    pub fn incomplete_rows(&self) -> usize {
        self.records.iter().filter(|r| r.has_missing()).count()
    }
}
