// src/acquisition/resample.rs
//! Sampling-rate correction by linear interpolation
//!
//! A channel arriving at the wrong rate is corrected, never treated as an
//! error. Linear interpolation is adequate here because every trace has
//! already been band-limited well below the Nyquist frequency of either
//! rate by the acquisition bandpass.

/// Resample `data` from `from_rate` to `to_rate` Hz
///
/// Output length is the input duration at the new rate, rounded to the
/// nearest sample. Identical rates return the input unchanged.
pub fn resample_linear(data: &[f64], from_rate: f64, to_rate: f64) -> Vec<f64> {
    if data.is_empty() || (from_rate - to_rate).abs() < f64::EPSILON {
        return data.to_vec();
    }

    let n_out = ((data.len() as f64) * to_rate / from_rate).round() as usize;
    let step = from_rate / to_rate;
    let last = data.len() - 1;

    (0..n_out)
        .map(|i| {
            let pos = i as f64 * step;
            let i0 = (pos.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let frac = pos - i0 as f64;
            data[i0] + (data[i1] - data[i0]) * frac
        })
        .collect()
}
