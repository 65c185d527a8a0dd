// src/detect/stats.rs
//! Robust statistics shared by the quality filter and arrival refiner
//!
//! Degenerate inputs (empty slices, zero variance, zero MAD) yield `None`
//! rather than NaN so the consuming rule can resolve them explicitly.

/// Arithmetic mean; zero for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance (second central moment); zero for an empty slice
pub fn variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / data.len() as f64
}

/// Excess kurtosis (Fisher definition, population moments)
///
/// `m4 / m2^2 - 3`, the statistic used to flag impulsive non-earthquake
/// signals. `None` when the slice is empty or the variance is zero.
pub fn kurtosis(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let m = mean(data);
    let n = data.len() as f64;
    let m2 = data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / n;
    if m2 == 0.0 {
        return None;
    }
    let m4 = data.iter().map(|&x| (x - m).powi(4)).sum::<f64>() / n;
    Some(m4 / (m2 * m2) - 3.0)
}

/// Median; `None` for an empty slice
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Median absolute deviation, the robust scale estimator behind the outlier ratio
pub fn mad(data: &[f64]) -> Option<f64> {
    let med = median(data)?;
    let deviations: Vec<f64> = data.iter().map(|&x| (x - med).abs()).collect();
    median(&deviations)
}

/// Fraction of samples whose robust z-score `|x - median| / MAD` exceeds `z_threshold`
///
/// `None` when the MAD is zero: a perfectly flat channel has an undefined
/// outlier ratio and indicates an acquisition problem, not a valid signal.
pub fn outlier_ratio(data: &[f64], z_threshold: f64) -> Option<f64> {
    let med = median(data)?;
    let scale = mad(data)?;
    if scale == 0.0 {
        return None;
    }
    let outliers = data
        .iter()
        .filter(|&&x| ((x - med) / scale).abs() > z_threshold)
        .count();
    Some(outliers as f64 / data.len() as f64)
}
