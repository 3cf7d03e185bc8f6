//! Road-load physics
//!
//! Turns a speed/RPM log into tractive force, wheel power, flywheel power
//! and torque. Every row is independent except acceleration, which looks one
//! row back.
//!
//! Undefined results are `None`: missing input cells, torque at 0 rpm.

use serde::Serialize;

use crate::datalog::{RawRecord, RawTable};
use crate::error::DynoError;
use crate::unit_conversion::{hp_to_kw, kmh_to_mps, kw_to_torque_nm, watts_to_hp};
use crate::vehicle::VehicleParameters;

/// Standard gravity (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Air density at sea level, 15 °C (kg/m³)
pub const AIR_DENSITY: f64 = 1.225;

/// A log row extended with every derived quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessedRecord {
    /// Seconds since the start of the log
    pub time: Option<f64>,
    /// Vehicle speed (km/h)
    pub speed_kmh: Option<f64>,
    /// Engine speed (rpm)
    pub rpm: Option<f64>,
    /// Vehicle speed (m/s)
    pub speed_mps: Option<f64>,
    /// Longitudinal acceleration (m/s²)
    pub acceleration_mps2: Option<f64>,
    /// Aerodynamic drag (N)
    pub drag_force_n: Option<f64>,
    /// Rolling resistance (N), identical on every row
    pub rolling_force_n: f64,
    /// Force needed to accelerate the vehicle mass (N)
    pub inertial_force_n: Option<f64>,
    /// Sum of drag, rolling and inertial force (N)
    pub tractive_force_n: Option<f64>,
    /// Power at the wheels (W)
    pub power_w: Option<f64>,
    /// Power at the wheels (hp)
    pub power_hp: Option<f64>,
    /// Power at the flywheel after loss and correction (hp)
    pub power_hp_flywheel: Option<f64>,
    /// Power at the flywheel (kW)
    pub power_kw_flywheel: Option<f64>,
    /// Flywheel torque (N·m); `None` at 0 rpm
    pub torque_nm: Option<f64>,
}

/// Rows derived from one log with one parameter set
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTable {
    records: Vec<ProcessedRecord>,
    params: VehicleParameters,
}

impl ProcessedTable {
    /// Get all rows
    pub fn records(&self) -> &[ProcessedRecord] {
        &self.records
    }

    /// Parameters the table was derived with
    pub fn params(&self) -> &VehicleParameters {
        &self.params
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Derive forces, power and torque for every row of `table`
///
/// Fails with [`DynoError::Config`] before touching any row when `params`
/// would produce undefined physics (e.g. transmission loss ≥ 1).
pub fn derive(table: &RawTable, params: &VehicleParameters) -> Result<ProcessedTable, DynoError> {
    params.validate()?;

    let rolling_force_n = rolling_force(params);
    let mut previous: Option<&RawRecord> = None;
    let mut records = Vec::with_capacity(table.len());

    for raw in table.records() {
        let acceleration = acceleration(previous, raw);
        records.push(derive_row(raw, acceleration, rolling_force_n, params));
        previous = Some(raw);
    }

    tracing::debug!(
        "Derived {} rows (rolling force {:.2} N)",
        records.len(),
        rolling_force_n
    );

    Ok(ProcessedTable {
        records,
        params: *params,
    })
}

/// Rolling resistance: `m · g · Crr`, independent of speed
pub fn rolling_force(params: &VehicleParameters) -> f64 {
    params.mass_kg * GRAVITY * params.rolling_resistance
}

/// Aerodynamic drag: `½ · ρ · Cd · A · v²`
pub fn drag_force(params: &VehicleParameters, speed_mps: f64) -> f64 {
    0.5 * AIR_DENSITY * params.drag_coefficient * params.frontal_area_m2 * speed_mps * speed_mps
}

/// Backward difference of speed over time.
///
/// The first row and rows with a zero time step report 0.
fn acceleration(previous: Option<&RawRecord>, current: &RawRecord) -> Option<f64> {
    let Some(previous) = previous else {
        return Some(0.0);
    };

    let dt = current.time? - previous.time?;
    let dv = kmh_to_mps(current.speed_kmh?) - kmh_to_mps(previous.speed_kmh?);
    if dt == 0.0 {
        Some(0.0)
    } else {
        Some(dv / dt)
    }
}

fn derive_row(
    raw: &RawRecord,
    acceleration_mps2: Option<f64>,
    rolling_force_n: f64,
    params: &VehicleParameters,
) -> ProcessedRecord {
    let speed_mps = raw.speed_kmh.map(kmh_to_mps);
    let drag_force_n = speed_mps.map(|v| drag_force(params, v));
    let inertial_force_n = acceleration_mps2.map(|a| params.mass_kg * a);

    let tractive_force_n = match (drag_force_n, inertial_force_n) {
        (Some(drag), Some(inertial)) => Some(drag + rolling_force_n + inertial),
        _ => None,
    };

    let power_w = match (tractive_force_n, speed_mps) {
        (Some(force), Some(v)) => Some(force * v),
        _ => None,
    };
    let power_hp = power_w.map(watts_to_hp);
    let power_hp_flywheel =
        power_hp.map(|hp| hp * params.drivetrain_factor() * params.power_correction);
    let power_kw_flywheel = power_hp_flywheel.map(hp_to_kw);

    let torque_nm = match (power_kw_flywheel, raw.rpm) {
        (Some(kw), Some(rpm)) => kw_to_torque_nm(kw, rpm).map(|t| t * params.torque_correction),
        _ => None,
    };

    ProcessedRecord {
        time: raw.time,
        speed_kmh: raw.speed_kmh,
        rpm: raw.rpm,
        speed_mps,
        acceleration_mps2,
        drag_force_n,
        rolling_force_n,
        inertial_force_n,
        tractive_force_n,
        power_w,
        power_hp,
        power_hp_flywheel,
        power_kw_flywheel,
        torque_nm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pull() -> RawTable {
        RawTable::from_records(vec![
            RawRecord::new(0.0, 0.0, 1000.0),
            RawRecord::new(1.0, 36.0, 3000.0),
            RawRecord::new(2.0, 72.0, 5000.0),
        ])
    }

    #[test]
    fn test_acceleration_first_row_and_zero_dt() {
        let first = RawRecord::new(5.0, 50.0, 2000.0);
        assert_eq!(acceleration(None, &first), Some(0.0));

        let same_time = RawRecord::new(5.0, 60.0, 2100.0);
        assert_eq!(acceleration(Some(&first), &same_time), Some(0.0));
    }

    #[test]
    fn test_acceleration_missing_cells() {
        let first = RawRecord::new(0.0, 0.0, 1000.0);
        let gap = RawRecord {
            time: None,
            ..RawRecord::new(1.0, 36.0, 3000.0)
        };
        assert_eq!(acceleration(Some(&first), &gap), None);
        assert_eq!(acceleration(Some(&gap), &first), None);
    }

    #[test]
    fn test_drag_force() {
        let params = VehicleParameters::default();
        // 0.5 * 1.225 * 0.3 * 2.2 * 10²
        assert!((drag_force(&params, 10.0) - 40.425).abs() < 1e-9);
        assert_eq!(drag_force(&params, 0.0), 0.0);
    }

    #[test]
    fn test_derive_second_row() {
        let table = derive(&pull(), &VehicleParameters::default()).unwrap();
        let row = table.records()[1];

        assert_eq!(row.speed_mps, Some(10.0));
        assert_eq!(row.acceleration_mps2, Some(10.0));

        let tractive = 40.425 + 147.15 + 15000.0;
        assert!((row.tractive_force_n.unwrap() - tractive).abs() < 1e-6);

        let flywheel_hp = tractive * 10.0 / 735.5 / 0.9;
        assert!((row.power_hp_flywheel.unwrap() - flywheel_hp).abs() < 1e-6);

        let torque = flywheel_hp * 0.7355 * 9550.0 / 3000.0;
        assert!((row.torque_nm.unwrap() - torque).abs() < 1e-6);
    }

    #[test]
    fn test_correction_factors_scale_outputs() {
        let base = derive(&pull(), &VehicleParameters::default()).unwrap();
        let corrected = derive(
            &pull(),
            &VehicleParameters {
                power_correction: 1.1,
                torque_correction: 0.5,
                ..Default::default()
            },
        )
        .unwrap();

        let (b, c) = (base.records()[2], corrected.records()[2]);
        assert!((c.power_hp_flywheel.unwrap() - b.power_hp_flywheel.unwrap() * 1.1).abs() < 1e-9);
        // torque follows corrected power, then its own factor
        assert!((c.torque_nm.unwrap() - b.torque_nm.unwrap() * 1.1 * 0.5).abs() < 1e-9);
        // wheel power is untouched by either factor
        assert_eq!(c.power_w, b.power_w);
    }

    #[test]
    fn test_zero_rpm_torque_undefined() {
        let table = RawTable::from_records(vec![
            RawRecord::new(0.0, 20.0, 0.0),
            RawRecord::new(1.0, 30.0, 0.0),
        ]);
        let processed = derive(&table, &VehicleParameters::default()).unwrap();
        assert!(processed.records().iter().all(|r| r.torque_nm.is_none()));
        assert!(processed.records()[1].power_hp_flywheel.is_some());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = VehicleParameters {
            transmission_loss: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            derive(&pull(), &params),
            Err(DynoError::Config(_))
        ));
    }
}
