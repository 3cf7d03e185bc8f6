//! Vehicle parameters used by the road-load model

use serde::{Deserialize, Serialize};

use crate::error::DynoError;

/// Vehicle and drivetrain description for one run
///
/// Immutable once built; each dataset gets its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParameters {
    /// Vehicle mass including driver (kg)
    pub mass_kg: f64,

    /// Aerodynamic drag coefficient
    pub drag_coefficient: f64,

    /// Frontal area (m²)
    pub frontal_area_m2: f64,

    /// Rolling resistance coefficient
    pub rolling_resistance: f64,

    /// Fraction of flywheel power lost in the drivetrain (0 ≤ loss < 1)
    pub transmission_loss: f64,

    /// Multiplier applied to flywheel power
    pub power_correction: f64,

    /// Multiplier applied to torque
    pub torque_correction: f64,
}

impl Default for VehicleParameters {
    fn default() -> Self {
        Self {
            mass_kg: 1500.0,
            drag_coefficient: 0.3,
            frontal_area_m2: 2.2,
            rolling_resistance: 0.01,
            transmission_loss: 0.1,
            power_correction: 1.0,
            torque_correction: 1.0,
        }
    }
}

impl VehicleParameters {
    /// Check that every parameter yields defined physics
    pub fn validate(&self) -> Result<(), DynoError> {
        let fields = [
            ("mass", self.mass_kg),
            ("drag coefficient", self.drag_coefficient),
            ("frontal area", self.frontal_area_m2),
            ("rolling resistance", self.rolling_resistance),
            ("transmission loss", self.transmission_loss),
            ("power correction", self.power_correction),
            ("torque correction", self.torque_correction),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DynoError::Config(format!("{name} must be finite, got {value}")));
        }

        if self.mass_kg <= 0.0 {
            return Err(DynoError::Config(format!(
                "mass must be positive, got {} kg",
                self.mass_kg
            )));
        }

        for (name, value) in [
            ("drag coefficient", self.drag_coefficient),
            ("frontal area", self.frontal_area_m2),
            ("rolling resistance", self.rolling_resistance),
        ] {
            if value < 0.0 {
                return Err(DynoError::Config(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !(0.0..1.0).contains(&self.transmission_loss) {
            return Err(DynoError::Config(format!(
                "transmission loss must be in [0, 1), got {}",
                self.transmission_loss
            )));
        }

        for (name, value) in [
            ("power correction", self.power_correction),
            ("torque correction", self.torque_correction),
        ] {
            if value <= 0.0 {
                return Err(DynoError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Multiplier from wheel power to flywheel power: `1 / (1 - loss)`
    pub fn drivetrain_factor(&self) -> f64 {
        1.0 / (1.0 - self.transmission_loss)
    }
}
