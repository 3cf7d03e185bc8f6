//! Curve Smoothing Module
//!
//! Orders a processed run by engine speed, smooths power and torque with a
//! 1-D Gaussian kernel and locates the peaks used for chart annotations.

use serde::{Deserialize, Serialize};

use crate::error::DynoError;
use crate::physics::{ProcessedRecord, ProcessedTable};

/// Kernel standard deviation, in samples
pub const SMOOTHING_SIGMA: f64 = 4.0;

/// Kernel half-width in standard deviations
pub const KERNEL_TRUNCATE: f64 = 4.0;

/// One point of a smoothed curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Engine speed (rpm)
    pub rpm: f64,
    /// Smoothed flywheel power (hp)
    pub power_hp: f64,
    /// Smoothed flywheel torque (N·m)
    pub torque_nm: f64,
}

/// Maximum of a smoothed series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Peak value (hp or N·m)
    pub value: f64,
    /// Engine speed at the peak
    pub rpm: f64,
    /// Index of the peak in the rpm-ordered curve
    pub index: usize,
}

/// Smoothed power/torque curve ordered by rpm, with its peaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedCurve {
    /// Points in ascending rpm order
    pub points: Vec<CurvePoint>,
    /// Highest smoothed power
    pub peak_power: Peak,
    /// Highest smoothed torque
    pub peak_torque: Peak,
}

impl SmoothedCurve {
    /// Get the number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Engine speeds, ascending
    pub fn rpms(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.rpm).collect()
    }

    /// Smoothed power series aligned with [`rpms`](Self::rpms)
    pub fn power(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.power_hp).collect()
    }

    /// Smoothed torque series aligned with [`rpms`](Self::rpms)
    pub fn torque(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.torque_nm).collect()
    }
}

/// Sort rows by rpm and smooth power and torque
///
/// Rows without rpm, flywheel power or torque are left out. Fewer than two
/// usable rows are returned unsmoothed.
pub fn smooth_and_peak(table: &ProcessedTable) -> Result<SmoothedCurve, DynoError> {
    let mut samples: Vec<(f64, f64, f64)> = table
        .records()
        .iter()
        .filter_map(usable_sample)
        .collect();

    let skipped = table.len() - samples.len();
    if skipped > 0 {
        tracing::debug!("Skipping {} rows with undefined rpm, power or torque", skipped);
    }
    if samples.is_empty() {
        return Err(DynoError::NoSamples);
    }

    sort_by_rpm(&mut samples);

    let power: Vec<f64> = samples.iter().map(|s| s.1).collect();
    let torque: Vec<f64> = samples.iter().map(|s| s.2).collect();
    let (power, torque) = if samples.len() < 2 {
        (power, torque)
    } else {
        (
            gaussian_filter1d(&power, SMOOTHING_SIGMA),
            gaussian_filter1d(&torque, SMOOTHING_SIGMA),
        )
    };

    let points: Vec<CurvePoint> = samples
        .iter()
        .zip(power.iter().zip(torque.iter()))
        .map(|(&(rpm, _, _), (&power_hp, &torque_nm))| CurvePoint {
            rpm,
            power_hp,
            torque_nm,
        })
        .collect();

    let peak_at = |index: usize, value: f64| Peak {
        value,
        rpm: points[index].rpm,
        index,
    };
    let power_idx = argmax(&power).ok_or(DynoError::NoSamples)?;
    let torque_idx = argmax(&torque).ok_or(DynoError::NoSamples)?;
    let peak_power = peak_at(power_idx, power[power_idx]);
    let peak_torque = peak_at(torque_idx, torque[torque_idx]);

    Ok(SmoothedCurve {
        points,
        peak_power,
        peak_torque,
    })
}

fn usable_sample(record: &ProcessedRecord) -> Option<(f64, f64, f64)> {
    Some((record.rpm?, record.power_hp_flywheel?, record.torque_nm?))
}

/// Stable ascending sort on the first tuple field (rpm)
pub fn sort_by_rpm<T>(samples: &mut [(f64, T, T)]) {
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
}

/// Index of the first occurrence of the maximum value
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= v => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Normalized Gaussian weights for offsets `-r..=r`, `r = round(truncate·σ)`
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as usize;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let offset = i as f64 - radius as f64;
            (-offset * offset / two_sigma_sq).exp()
        })
        .collect();

    let total: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= total;
    }
    weights
}

/// Smooth a 1-D series with a Gaussian kernel of standard deviation `sigma`
///
/// Out-of-range samples are taken by half-sample symmetric reflection
/// (`d c b a | a b c d | d c b a`), repeated as often as the kernel needs.
/// `sigma <= 0` returns the input unchanged.
pub fn gaussian_filter1d(values: &[f64], sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 || values.is_empty() {
        return values.to_vec();
    }

    let kernel = gaussian_kernel(sigma, KERNEL_TRUNCATE);
    let radius = (kernel.len() / 2) as isize;
    let len = values.len();

    (0..len as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * values[reflect_index(i + k as isize - radius, len)])
                .sum()
        })
        .collect()
}

/// Map any index onto `0..len` by mirroring about the sample edges
fn reflect_index(index: isize, len: usize) -> usize {
    let period = 2 * len as isize;
    let folded = index.rem_euclid(period) as usize;
    if folded < len {
        folded
    } else {
        period as usize - 1 - folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_shape() {
        let kernel = gaussian_kernel(4.0, 4.0);
        assert_eq!(kernel.len(), 33);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((kernel[0] - kernel[32]).abs() < 1e-15);
        assert!(kernel[16] > kernel[15]);
    }

    #[test]
    fn test_reflect_index() {
        // d c b a | a b c d | d c b a
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(2, 4), 2);
    }

    #[test]
    fn test_constant_series_unchanged() {
        let values = vec![7.5; 10];
        for v in gaussian_filter1d(&values, 4.0) {
            assert!((v - 7.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_interior_preserved() {
        let values: Vec<f64> = (0..60).map(|i| i as f64 * 2.0).collect();
        let smoothed = gaussian_filter1d(&values, 4.0);
        assert_eq!(smoothed.len(), values.len());
        for i in 16..44 {
            assert!((smoothed[i] - values[i]).abs() < 1e-9, "index {}", i);
        }
    }

    #[test]
    fn test_zero_sigma_passthrough() {
        let values = vec![1.0, 5.0, 2.0];
        assert_eq!(gaussian_filter1d(&values, 0.0), values);
    }

    #[test]
    fn test_argmax_first_occurrence() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0, 3.0]), Some(1));
        assert_eq!(argmax(&[-1.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_sort_by_rpm_is_stable() {
        let mut samples = vec![(3000.0, 1, 1), (1000.0, 2, 2), (3000.0, 3, 3)];
        sort_by_rpm(&mut samples);
        assert_eq!(samples, vec![(1000.0, 2, 2), (3000.0, 1, 1), (3000.0, 3, 3)]);
    }
}
