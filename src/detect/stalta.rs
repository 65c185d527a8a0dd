// src/detect/stalta.rs
//! Classic STA/LTA characteristic function and hysteresis onset picking
//!
//! The short-term/long-term average energy ratio is the single-channel
//! statistic feeding the coincidence detector. Indices before the long
//! window has filled are forced to zero, and a vanishing long-term energy
//! is clamped to the smallest positive double so the ratio never becomes
//! NaN or infinite on silent input.

/// One hysteresis on/off span in sample indices (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnsetSpan {
    pub on: usize,
    pub off: usize,
}

/// Classic STA/LTA characteristic function over squared amplitudes
///
/// `nsta` and `nlta` are the short and long window lengths in samples.
/// The returned vector has one ratio per input sample; the first
/// `nlta - 1` entries are zero.
pub fn classic_sta_lta(data: &[f64], nsta: usize, nlta: usize) -> Vec<f64> {
    let n = data.len();
    let mut cft = vec![0.0; n];
    if nsta == 0 || nlta == 0 || n < nlta {
        return cft;
    }

    // Prefix sum of energy; window averages are two lookups each
    let mut energy = vec![0.0; n + 1];
    for (i, &x) in data.iter().enumerate() {
        energy[i + 1] = energy[i] + x * x;
    }

    for i in (nlta - 1)..n {
        let sta_lo = (i + 1).saturating_sub(nsta);
        let sta = (energy[i + 1] - energy[sta_lo]) / nsta as f64;
        let lta = (energy[i + 1] - energy[i + 1 - nlta]) / nlta as f64;
        cft[i] = sta / lta.max(f64::MIN_POSITIVE);
    }
    cft
}

/// Hysteresis trigger picking over a characteristic function
///
/// A channel turns on where the ratio exceeds `trig_on` and stays on until
/// it drops below `trig_off`, which suppresses chatter around the threshold.
/// A span still on at the end of the data closes at the last sample.
pub fn trigger_onset(cft: &[f64], trig_on: f64, trig_off: f64) -> Vec<OnsetSpan> {
    let mut spans = Vec::new();
    let mut on_at: Option<usize> = None;

    for (i, &ratio) in cft.iter().enumerate() {
        match on_at {
            None if ratio > trig_on => on_at = Some(i),
            Some(on) if ratio < trig_off => {
                spans.push(OnsetSpan { on, off: i });
                on_at = None;
            }
            _ => {}
        }
    }
    if let Some(on) = on_at {
        spans.push(OnsetSpan {
            on,
            off: cft.len() - 1,
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn background(n: usize, amp: f64) -> Vec<f64> {
        // Alternating-sign constant-energy background
        (0..n)
            .map(|i| if i % 2 == 0 { amp } else { -amp })
            .collect()
    }

    #[test]
    fn test_flat_input_stays_at_unity() {
        let data = background(2000, 1.0);
        let cft = classic_sta_lta(&data, 80, 700);
        for &r in &cft[..699] {
            assert_eq!(r, 0.0);
        }
        for &r in &cft[699..] {
            assert!((r - 1.0).abs() < 1e-9);
        }
        assert!(trigger_onset(&cft, 3.0, 2.0).is_empty());
    }

    #[test]
    fn test_zero_input_never_divides_by_zero() {
        let data = vec![0.0; 1500];
        let cft = classic_sta_lta(&data, 80, 700);
        assert!(cft.iter().all(|r| r.is_finite()));
        assert!(cft.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_impulse_triggers_at_impulse_sample() {
        let mut data = background(3000, 1.0);
        data[1500] = 100.0;
        let cft = classic_sta_lta(&data, 80, 700);
        let spans = trigger_onset(&cft, 3.0, 2.0);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].on >= 1499 && spans[0].on <= 1501);
        assert!(spans[0].off > spans[0].on);
    }

    #[test]
    fn test_hysteresis_keeps_span_open_between_thresholds() {
        // Ratio shaped by hand: above on, between off and on, then below off
        let cft = vec![0.0, 0.0, 4.0, 2.5, 2.5, 1.0, 0.0];
        let spans = trigger_onset(&cft, 3.0, 2.0);
        assert_eq!(spans, vec![OnsetSpan { on: 2, off: 5 }]);
    }

    #[test]
    fn test_open_span_closes_at_end() {
        let cft = vec![0.0, 4.0, 4.0, 4.0];
        let spans = trigger_onset(&cft, 3.0, 2.0);
        assert_eq!(spans, vec![OnsetSpan { on: 1, off: 3 }]);
    }

    #[test]
    fn test_short_input_returns_zeros() {
        let data = background(100, 1.0);
        let cft = classic_sta_lta(&data, 80, 700);
        assert!(cft.iter().all(|&r| r == 0.0));
    }

    proptest! {
        #[test]
        fn prop_flat_input_never_triggers(amp in 0.0f64..1e6, n in 800usize..3000) {
            let data = background(n, amp);
            let cft = classic_sta_lta(&data, 80, 700);
            prop_assert!(trigger_onset(&cft, 3.0, 2.0).is_empty());
        }

        #[test]
        fn prop_cft_is_finite_and_nonnegative(data in prop::collection::vec(-1e3f64..1e3, 700..1200)) {
            let cft = classic_sta_lta(&data, 80, 700);
            prop_assert!(cft.iter().all(|r| r.is_finite() && *r >= 0.0));
        }
    }
}
