// src/detect/picker.rs
//! AIC arrival-time refinement
//!
//! The refiner locates the most likely boundary between a noise segment and
//! a signal segment under a piecewise-stationary-variance model: for every
//! split of the analysis window the score
//! `(k+1)*log10(var_before) + (nsamp-k)*log10(var_after)` is evaluated and
//! the minimum taken. Splits where either side has exactly zero variance
//! are undefined and excluded from the search, never treated as zero or
//! negative infinity.

use crate::config::PipelineConfig;

/// Samples ignored at each end of the window to avoid edge artifacts
const EDGE_GUARD: usize = 10;

/// Variance-change-point picker over a window centered on the trigger guess
#[derive(Debug, Clone, Copy)]
pub struct AicPicker {
    nsamp: usize,
}

impl AicPicker {
    /// Window length is `ptrig * samprate` samples, fixed at construction
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            nsamp: (cfg.window.ptrig * cfg.station.samprate).round() as usize,
        }
    }

    /// Analysis window length in samples
    pub fn window_len(&self) -> usize {
        self.nsamp
    }

    /// Refine an approximate trigger sample to the best variance split
    ///
    /// Returns the refined sample offset relative to the start of `data`,
    /// or `None` when the centered window does not fit inside `data` or
    /// every split score is undefined (callers keep the unrefined pick).
    pub fn refine(&self, data: &[f64], initial: usize) -> Option<usize> {
        let nsamp = self.nsamp;
        if nsamp <= 2 * EDGE_GUARD {
            return None;
        }
        let start = initial.checked_sub(nsamp / 2)?;
        let window = data.get(start..start + nsamp)?;

        // Running variances from both ends (Welford): exact zeros for
        // constant runs, no catastrophic cancellation
        let forward = running_variance(window.iter().copied());
        let backward = {
            let mut v = running_variance(window.iter().rev().copied());
            v.reverse();
            v
        };

        let mut best: Option<(usize, f64)> = None;
        for k in EDGE_GUARD..(nsamp - EDGE_GUARD) {
            let var_before = forward[k];
            // Variance of window[k..nsamp], count nsamp - k
            let var_after = backward[k];
            if var_before == 0.0 || var_after == 0.0 {
                continue;
            }
            let score =
                (k + 1) as f64 * var_before.log10() + (nsamp - k) as f64 * var_after.log10();
            match best {
                Some((_, s)) if s <= score => {}
                _ => best = Some((k, score)),
            }
        }
        best.map(|(k, _)| start + k)
    }
}

/// `out[i]` = population variance of the first `i + 1` items
fn running_variance(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out = Vec::new();
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, x) in values.enumerate() {
        let n = (i + 1) as f64;
        let delta = x - mean;
        mean += delta / n;
        m2 += delta * (x - mean);
        out.push(m2 / n);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn picker() -> AicPicker {
        // Default configuration: ptrig 10 s at 100 Hz -> 1000-sample window
        AicPicker::new(&PipelineConfig::default())
    }

    /// Quiet dithered noise followed by a loud section starting at `k0`
    fn step_signal(n: usize, k0: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                if i < k0 {
                    0.01 * sign * (1.0 + 0.1 * ((i % 7) as f64))
                } else {
                    5.0 * sign * (1.0 + 0.1 * ((i % 11) as f64))
                }
            })
            .collect()
    }

    #[test]
    fn test_refine_finds_variance_change() {
        let p = picker();
        let k0 = 2000;
        let data = step_signal(4000, k0);
        // Initial guess 150 samples late; the change point is inside the window
        let pick = p.refine(&data, k0 + 150).unwrap();
        assert!(
            (pick as i64 - k0 as i64).abs() <= 1,
            "pick {pick} not within one sample of {k0}"
        );
    }

    #[test]
    fn test_refine_centers_window_on_initial() {
        let p = picker();
        let k0 = 2000;
        let data = step_signal(4000, k0);
        // Guess 150 samples early also brackets the change point
        let pick = p.refine(&data, k0 - 150).unwrap();
        assert!((pick as i64 - k0 as i64).abs() <= 1);
    }

    #[test]
    fn test_window_outside_data_is_none() {
        let p = picker();
        let data = step_signal(4000, 2000);
        assert_eq!(p.refine(&data, 100), None);
        assert_eq!(p.refine(&data, 3900), None);
        assert_eq!(p.refine(&data[..600], 300), None);
    }

    #[test]
    fn test_flat_window_is_none() {
        let p = picker();
        let data = vec![1.0; 4000];
        assert_eq!(p.refine(&data, 2000), None);
    }

    #[test]
    fn test_zero_variance_prefix_excluded() {
        // Exactly constant before the change point: splits with a flat
        // side are undefined and must not win the minimum search
        let p = picker();
        let k0 = 2000;
        let data: Vec<f64> = (0..4000)
            .map(|i| {
                if i < k0 {
                    0.0
                } else if i % 2 == 0 {
                    3.0
                } else {
                    -3.0
                }
            })
            .collect();
        let pick = p.refine(&data, k0).unwrap();
        // All-zero prefixes force the pick toward the first defined splits
        assert!(pick >= k0 - p.window_len() / 2 + EDGE_GUARD);
        assert!(pick < k0 + p.window_len() / 2 - EDGE_GUARD);
    }
}
