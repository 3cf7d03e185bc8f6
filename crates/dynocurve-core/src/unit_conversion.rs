//! Unit Conversion Functions
//!
//! Provides the conversions the road-load calculation needs:
//! - Speed: km/h → m/s
//! - Power: W → hp (metric horsepower), hp → kW
//! - Torque: kW at a given engine speed → N·m

/// Watts per metric horsepower
pub const WATTS_PER_HP: f64 = 735.5;

/// Kilowatts per metric horsepower
pub const KW_PER_HP: f64 = 0.7355;

/// Torque constant: `T[N·m] = P[kW] × 9550 / n[rpm]`
pub const TORQUE_CONSTANT: f64 = 9550.0;

/// Convert km/h to m/s
pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh * 1000.0 / 3600.0
}

/// Convert watts to metric horsepower
pub fn watts_to_hp(watts: f64) -> f64 {
    watts / WATTS_PER_HP
}

/// Convert metric horsepower to kilowatts
pub fn hp_to_kw(hp: f64) -> f64 {
    hp * KW_PER_HP
}

/// Torque in N·m delivered at `rpm` for a power of `kw`
///
/// Returns `None` when the engine speed is zero, where torque is undefined.
pub fn kw_to_torque_nm(kw: f64, rpm: f64) -> Option<f64> {
    if rpm == 0.0 {
        None
    } else {
        Some(kw * TORQUE_CONSTANT / rpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kmh_mps_conversion() {
        assert!((kmh_to_mps(36.0) - 10.0).abs() < 1e-12);
        assert!((kmh_to_mps(100.0) - 27.78).abs() < 0.01);
        assert_eq!(kmh_to_mps(0.0), 0.0);
    }

    #[test]
    fn test_power_conversion() {
        assert!((watts_to_hp(735.5) - 1.0).abs() < 1e-12);
        assert!((hp_to_kw(100.0) - 73.55).abs() < 1e-9);
    }

    #[test]
    fn test_torque_from_power() {
        // 100 kW at 5000 rpm is ~191 N·m
        let torque = kw_to_torque_nm(100.0, 5000.0).unwrap();
        assert!((torque - 191.0).abs() < 0.01);
        assert_eq!(kw_to_torque_nm(100.0, 0.0), None);
    }
}
