//! Run pipeline
//!
//! One entry point takes a run from log file to smoothed curve. A comparison
//! runs each dataset through its own pipeline so a bad run never blocks the
//! other one.

use crate::chart::{render, Chart, DisplayMode};
use crate::config::{DatasetConfig, SessionConfig, DEFAULT_FIRST_LABEL, DEFAULT_SECOND_LABEL};
use crate::datalog;
use crate::error::DynoError;
use crate::physics;
use crate::smoothing::{smooth_and_peak, SmoothedCurve};

/// Position of a dataset in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSlot {
    /// Solid lines
    First,
    /// Dashed lines
    Second,
}

impl std::fmt::Display for DatasetSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSlot::First => write!(f, "first dataset"),
            DatasetSlot::Second => write!(f, "second dataset"),
        }
    }
}

/// A dataset that dropped out of the comparison
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFailure {
    /// Which dataset
    pub slot: DatasetSlot,
    /// Label of the dataset
    pub label: String,
    /// Why it was excluded
    pub error: DynoError,
}

/// Result of comparing up to two runs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comparison {
    /// Curve of the first run, if it processed
    pub first: Option<SmoothedCurve>,
    /// Curve of the second run, if it processed
    pub second: Option<SmoothedCurve>,
    /// The chart, unless nothing could be drawn
    pub chart: Option<Chart>,
    /// Datasets excluded from the chart
    pub failures: Vec<DatasetFailure>,
    /// [`DynoError::EmptyInput`] when no chart could be built
    pub empty: Option<DynoError>,
}

impl Comparison {
    /// Curve for a slot
    pub fn curve(&self, slot: DatasetSlot) -> Option<&SmoothedCurve> {
        match slot {
            DatasetSlot::First => self.first.as_ref(),
            DatasetSlot::Second => self.second.as_ref(),
        }
    }

    /// Failure for a slot
    pub fn failure(&self, slot: DatasetSlot) -> Option<&DatasetFailure> {
        self.failures.iter().find(|f| f.slot == slot)
    }
}

/// Load, derive and smooth one run
pub fn process_dataset(dataset: &DatasetConfig) -> Result<SmoothedCurve, DynoError> {
    let raw = datalog::load(&dataset.path, &dataset.columns)?;
    let processed = physics::derive(&raw, &dataset.vehicle)?;
    let curve = smooth_and_peak(&processed)?;

    tracing::debug!(
        "'{}': {} points, peak {:.1} hp @ {:.0} rpm, {:.1} N·m @ {:.0} rpm",
        dataset.label,
        curve.len(),
        curve.peak_power.value,
        curve.peak_power.rpm,
        curve.peak_torque.value,
        curve.peak_torque.rpm
    );
    Ok(curve)
}

/// Process both runs independently and build the chart for `mode`
///
/// Errors stay with their dataset: a failed run is logged, recorded in
/// [`Comparison::failures`] and treated as absent. Blank labels are shown
/// as "Run 1" / "Run 2".
pub fn compare(
    first: Option<&DatasetConfig>,
    second: Option<&DatasetConfig>,
    mode: DisplayMode,
) -> Comparison {
    let mut comparison = Comparison::default();

    let label1 = first.map_or(DEFAULT_FIRST_LABEL, |d| d.label_or(DEFAULT_FIRST_LABEL));
    let label2 = second.map_or(DEFAULT_SECOND_LABEL, |d| d.label_or(DEFAULT_SECOND_LABEL));

    comparison.first = run_slot(DatasetSlot::First, first, label1, &mut comparison.failures);
    comparison.second = run_slot(DatasetSlot::Second, second, label2, &mut comparison.failures);

    comparison.chart = render(
        comparison.first.as_ref(),
        comparison.second.as_ref(),
        mode,
        label1,
        label2,
    );

    if comparison.chart.is_none() {
        tracing::warn!("Nothing to draw for display mode {:?}", mode);
        comparison.empty = Some(DynoError::EmptyInput);
    }
    comparison
}

/// Run the comparison described by a session file
pub fn compare_session(session: &SessionConfig) -> Comparison {
    compare(session.first.as_ref(), session.second.as_ref(), session.mode)
}

fn run_slot(
    slot: DatasetSlot,
    dataset: Option<&DatasetConfig>,
    label: &str,
    failures: &mut Vec<DatasetFailure>,
) -> Option<SmoothedCurve> {
    let dataset = dataset?;
    match process_dataset(dataset) {
        Ok(curve) => Some(curve),
        Err(error) => {
            tracing::warn!(
                "Excluding {} '{}' ({}): {}",
                slot,
                label,
                dataset.path.display(),
                error
            );
            failures.push(DatasetFailure {
                slot,
                label: label.to_string(),
                error,
            });
            None
        }
    }
}
