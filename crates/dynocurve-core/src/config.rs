//! Session configuration
//!
//! A session describes up to two runs (file, label, vehicle) and how to
//! display them. It is read from JSON; the pipeline never writes it back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chart::DisplayMode;
use crate::datalog::ColumnMap;
use crate::error::DynoError;
use crate::vehicle::VehicleParameters;

/// Default label of the first run
pub const DEFAULT_FIRST_LABEL: &str = "Run 1";
/// Default label of the second run
pub const DEFAULT_SECOND_LABEL: &str = "Run 2";

/// One run: where its log is and how to interpret it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Log file path
    pub path: PathBuf,

    /// Name shown in the legend and peak summary
    #[serde(default)]
    pub label: String,

    /// Vehicle used for the physics
    #[serde(default)]
    pub vehicle: VehicleParameters,

    /// Header names of the required channels
    #[serde(default)]
    pub columns: ColumnMap,
}

impl DatasetConfig {
    /// Create a run with default vehicle and column names
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            vehicle: VehicleParameters::default(),
            columns: ColumnMap::default(),
        }
    }

    /// Replace the vehicle parameters
    pub fn with_vehicle(mut self, vehicle: VehicleParameters) -> Self {
        self.vehicle = vehicle;
        self
    }

    /// Replace the column names
    pub fn with_columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    /// The label, or `default` when it is blank
    pub fn label_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.label.trim().is_empty() {
            default
        } else {
            &self.label
        }
    }
}

/// Two-run comparison session stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Config version for migrations
    #[serde(default = "default_version")]
    pub version: String,

    /// First run
    #[serde(default)]
    pub first: Option<DatasetConfig>,

    /// Second run
    #[serde(default)]
    pub second: Option<DatasetConfig>,

    /// Which runs to draw
    #[serde(default)]
    pub mode: DisplayMode,

    /// Chart image path
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            first: None,
            second: None,
            mode: DisplayMode::default(),
            output: None,
        }
    }
}

impl SessionConfig {
    /// Load a session file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DynoError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DynoError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    /// Parse a session from JSON text
    ///
    /// Empty labels are replaced by "Run 1" / "Run 2".
    pub fn from_json(content: &str) -> Result<Self, DynoError> {
        let mut session: SessionConfig = serde_json::from_str(content)?;
        session.fill_default_labels();
        Ok(session)
    }

    /// A session template with both runs at default settings
    pub fn template() -> Self {
        Self {
            version: default_version(),
            first: Some(DatasetConfig::new("first.csv", DEFAULT_FIRST_LABEL)),
            second: Some(DatasetConfig::new("second.csv", DEFAULT_SECOND_LABEL)),
            mode: DisplayMode::Both,
            output: Some(PathBuf::from("power_torque.png")),
        }
    }

    /// Pretty JSON form of the session
    pub fn to_json(&self) -> Result<String, DynoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Label of the first run, or its default
    pub fn first_label(&self) -> &str {
        self.first
            .as_ref()
            .map_or(DEFAULT_FIRST_LABEL, |d| d.label_or(DEFAULT_FIRST_LABEL))
    }

    /// Label of the second run, or its default
    pub fn second_label(&self) -> &str {
        self.second
            .as_ref()
            .map_or(DEFAULT_SECOND_LABEL, |d| d.label_or(DEFAULT_SECOND_LABEL))
    }

    fn fill_default_labels(&mut self) {
        for (dataset, default) in [
            (self.first.as_mut(), DEFAULT_FIRST_LABEL),
            (self.second.as_mut(), DEFAULT_SECOND_LABEL),
        ] {
            if let Some(dataset) = dataset {
                dataset.label = dataset.label_or(default).to_string();
            }
        }
    }
}
