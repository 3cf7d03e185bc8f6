//! # DynoCurve Core Library
//!
//! Core functionality for the DynoCurve road-log dyno.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Delimited datalog loading and column validation
//! - Road-load physics: tractive force, wheel and flywheel power, torque
//! - Gaussian curve smoothing and peak extraction
//! - Two-run comparison charts with PNG/SVG export
//!
//! ## Example
//!
//! ```rust,ignore
//! use dynocurve_core::prelude::*;
//!
//! let run = DatasetConfig::new("pull_3rd_gear.csv", "Stock");
//! let curve = process_dataset(&run)?;
//! println!("{:.1} hp @ {:.0} rpm", curve.peak_power.value, curve.peak_power.rpm);
//!
//! if let Some(chart) = render(Some(&curve), None, DisplayMode::First, "Stock", "") {
//!     chart.export("stock.png")?;
//! }
//! ```

pub mod chart;
pub mod config;
pub mod datalog;
pub mod error;
pub mod physics;
pub mod pipeline;
pub mod smoothing;
pub mod unit_conversion;
pub mod vehicle;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chart::{render, Chart, DisplayMode};
    pub use crate::config::{DatasetConfig, SessionConfig};
    pub use crate::datalog::{load, ColumnMap, RawRecord, RawTable};
    pub use crate::error::DynoError;
    pub use crate::physics::{derive, ProcessedRecord, ProcessedTable};
    pub use crate::pipeline::{compare, process_dataset, Comparison, DatasetSlot};
    pub use crate::smoothing::{smooth_and_peak, Peak, SmoothedCurve};
    pub use crate::vehicle::VehicleParameters;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
