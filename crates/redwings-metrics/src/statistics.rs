//! Descriptive statistics over metric series.

use redwings_core::AngleSample;

/// Mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Defined samples strictly above `floor`.
pub fn valid_above(series: &[AngleSample], floor: f64) -> Vec<f64> {
    series.iter().filter_map(|s| s.filter(|v| *v > floor)).collect()
}

/// All defined samples.
pub fn defined(series: &[AngleSample]) -> Vec<f64> {
    series.iter().flatten().copied().collect()
}
