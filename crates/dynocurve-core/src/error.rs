//! Pipeline errors

use thiserror::Error;

/// Errors that can occur while loading, deriving, smoothing or rendering a run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynoError {
    /// Required columns are absent from the log header
    #[error("Missing required columns {missing:?}; found columns {found:?}")]
    Schema {
        /// Column names that were required but not found
        missing: Vec<String>,
        /// Every header in the file
        found: Vec<String>,
    },

    /// File unreadable or not a well-formed delimited log
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid vehicle parameters or session file
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No row has rpm, power and torque all defined
    #[error("No usable samples: every row lacks rpm, power or torque")]
    NoSamples,

    /// The display mode selects no available curve
    #[error("Nothing to render: no valid dataset selected")]
    EmptyInput,

    /// Image export failed
    #[error("Render error: {0}")]
    Render(String),
}

impl From<std::io::Error> for DynoError {
    fn from(err: std::io::Error) -> Self {
        DynoError::Io(err.to_string())
    }
}

impl From<csv::Error> for DynoError {
    fn from(err: csv::Error) -> Self {
        DynoError::Io(format!("malformed log file: {err}"))
    }
}

impl From<serde_json::Error> for DynoError {
    fn from(err: serde_json::Error) -> Self {
        DynoError::Config(format!("session file: {err}"))
    }
}
