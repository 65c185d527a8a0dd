// src/detect/quality.rs
//! Statistical quality gating for extracted events
//!
//! Spikes and calibration pulses pass the coincidence detector but show up
//! as impulsive or heavy-tailed channel statistics. Each channel segment is
//! scored with a time-domain kurtosis, a spectral kurtosis of its magnitude
//! spectrum, and a robust outlier ratio; an event survives when enough
//! channels remain usable for downstream correlation.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::debug;

use crate::config::{KurtosisWindow, PipelineConfig};
use crate::detect::extractor::EventVector;
use crate::detect::stats;

/// Robust z-score magnitude above which a sample counts as an outlier
const OUTLIER_Z: f64 = 4.45;

/// Per-channel quality statistics
///
/// A statistic is `None` when it is undefined for the segment (zero
/// variance or zero MAD); undefined statistics flag the channel bad, since
/// a flat channel indicates an acquisition problem rather than signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelQuality {
    pub time_kurtosis: Option<f64>,
    pub spectral_kurtosis: Option<f64>,
    pub outlier_ratio: Option<f64>,
}

/// Event-level verdict with the per-channel breakdown
#[derive(Debug, Clone)]
pub struct EventQuality {
    pub channels: Vec<ChannelQuality>,
    pub bad_channels: usize,
    pub accepted: bool,
}

/// Partitions event batches into accepted and rejected sets
pub struct QualityFilter {
    kurtmax: f64,
    kurtfmax: f64,
    oratiomax: f64,
    ncor: usize,
    mode: KurtosisWindow,
    /// Sub-window bounds in samples for the windowed kurtosis mode
    kurt_lo: usize,
    kurt_hi: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl QualityFilter {
    /// Build a filter; the FFT plan for the fixed segment length is made once
    pub fn new(cfg: &PipelineConfig) -> Self {
        let sr = cfg.station.samprate;
        let wshape = cfg.window.wshape(sr);
        let center = cfg.window.ptrig;
        let half = cfg.quality.kurtwin / 2.0;
        let kurt_lo = ((center - half) * sr).max(0.0) as usize;
        let kurt_hi = (((center + half) * sr) as usize).min(wshape);

        let mut planner = FftPlanner::new();
        Self {
            kurtmax: cfg.quality.kurtmax,
            kurtfmax: cfg.quality.kurtfmax,
            oratiomax: cfg.quality.oratiomax,
            ncor: cfg.quality.ncor,
            mode: cfg.quality.kurtosis_window,
            kurt_lo,
            kurt_hi,
            fft: planner.plan_fft_forward(wshape),
        }
    }

    /// Score one channel segment
    pub fn assess_channel(&self, segment: &[f64]) -> ChannelQuality {
        let kurt_slice = match self.mode {
            KurtosisWindow::Whole => segment,
            KurtosisWindow::Windowed => {
                let hi = self.kurt_hi.min(segment.len());
                let lo = self.kurt_lo.min(hi);
                &segment[lo..hi]
            }
        };

        ChannelQuality {
            time_kurtosis: stats::kurtosis(kurt_slice),
            spectral_kurtosis: stats::kurtosis(&self.magnitude_spectrum(segment)),
            outlier_ratio: stats::outlier_ratio(segment, OUTLIER_Z),
        }
    }

    /// True when any statistic meets its threshold or is undefined
    pub fn channel_is_bad(&self, q: &ChannelQuality) -> bool {
        let time_bad = q.time_kurtosis.map_or(true, |k| k >= self.kurtmax);
        let spec_bad = q.spectral_kurtosis.map_or(true, |k| k >= self.kurtfmax);
        let ratio_bad = q.outlier_ratio.map_or(true, |r| r >= self.oratiomax);
        time_bad || spec_bad || ratio_bad
    }

    /// Score a whole event and apply the usable-channel rule
    pub fn assess(&self, event: &EventVector) -> EventQuality {
        let channels: Vec<ChannelQuality> = event
            .segments
            .iter()
            .map(|seg| self.assess_channel(&seg.data))
            .collect();
        let bad_channels = channels.iter().filter(|q| self.channel_is_bad(q)).count();
        let nsta = event.segments.len();
        // Enough good channels must remain for correlation
        let accepted = bad_channels as i64 <= nsta as i64 - self.ncor as i64;
        EventQuality {
            channels,
            bad_channels,
            accepted,
        }
    }

    /// Split a batch into (accepted, rejected), preserving order
    pub fn partition(&self, events: Vec<EventVector>) -> (Vec<EventVector>, Vec<EventVector>) {
        let verdicts: Vec<bool> = events
            .par_iter()
            .map(|ev| self.assess(ev).accepted)
            .collect();

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (event, ok) in events.into_iter().zip(verdicts) {
            if ok {
                accepted.push(event);
            } else {
                debug!(time = event.trigger_time, "event rejected by quality filter");
                rejected.push(event);
            }
        }
        (accepted, rejected)
    }

    /// Magnitude of the full complex spectrum, matching the length of the input
    fn magnitude_spectrum(&self, segment: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> = segment
            .iter()
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        if buffer.len() == self.fft.len() {
            self.fft.process(&mut buffer);
        } else {
            // Segments are normally exactly wshape; plan ad hoc otherwise
            FftPlanner::new()
                .plan_fft_forward(buffer.len())
                .process(&mut buffer);
        }
        buffer.iter().map(|c| c.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::ChannelId;
    use crate::config::PipelineConfig;
    use crate::detect::extractor::ChannelSegment;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    fn noise_segment(n: usize) -> Vec<f64> {
        // Deterministic broadband pseudo-noise with benign statistics
        let mut state = 0x9e3779b97f4a7c15u64;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
            })
            .collect()
    }

    fn event(segments: Vec<Vec<f64>>) -> EventVector {
        EventVector {
            trigger_time: 100.0,
            peak_ratio: 4.0,
            refined_onset: None,
            segments: segments
                .into_iter()
                .enumerate()
                .map(|(i, data)| ChannelSegment {
                    id: ChannelId::new("UW", &format!("ST{i}"), "--", "EHZ"),
                    data,
                })
                .collect(),
        }
    }

    #[test]
    fn test_benign_signal_passes() {
        let cfg = config();
        let filter = QualityFilter::new(&cfg);
        let wshape = cfg.window.wshape(cfg.station.samprate);
        let q = filter.assess_channel(&noise_segment(wshape));
        assert!(!filter.channel_is_bad(&q));
        assert!(q.time_kurtosis.unwrap().abs() < 10.0);
    }

    #[test]
    fn test_spike_flags_channel() {
        let cfg = config();
        let filter = QualityFilter::new(&cfg);
        let wshape = cfg.window.wshape(cfg.station.samprate);
        let mut data = noise_segment(wshape);
        // Single extreme sample at the trigger point inside the kurtosis window
        data[(cfg.window.ptrig * cfg.station.samprate) as usize] = 1e4;
        let q = filter.assess_channel(&data);
        assert!(q.time_kurtosis.unwrap() > cfg.quality.kurtmax);
        assert!(filter.channel_is_bad(&q));
    }

    #[test]
    fn test_calibration_pulse_flags_outlier_ratio() {
        let cfg = config();
        let filter = QualityFilter::new(&cfg);
        let wshape = cfg.window.wshape(cfg.station.samprate);
        let mut data = noise_segment(wshape);
        // Square block covering ten percent of the segment
        let block = wshape / 10;
        for x in data.iter_mut().take(wshape / 2 + block).skip(wshape / 2) {
            *x = 500.0;
        }
        let q = filter.assess_channel(&data);
        assert!(q.outlier_ratio.unwrap() >= cfg.quality.oratiomax);
        assert!(filter.channel_is_bad(&q));
    }

    #[test]
    fn test_flat_channel_is_conservatively_bad() {
        let cfg = config();
        let filter = QualityFilter::new(&cfg);
        let wshape = cfg.window.wshape(cfg.station.samprate);
        let q = filter.assess_channel(&vec![0.0; wshape]);
        assert_eq!(q.time_kurtosis, None);
        assert_eq!(q.outlier_ratio, None);
        assert!(filter.channel_is_bad(&q));
    }

    #[test]
    fn test_event_rule_counts_usable_channels() {
        let mut cfg = config();
        cfg.quality.ncor = 2;
        let filter = QualityFilter::new(&cfg);
        let wshape = cfg.window.wshape(cfg.station.samprate);

        // Three channels, one flat (bad): 2 usable >= ncor, accepted
        let ev = event(vec![
            noise_segment(wshape),
            noise_segment(wshape),
            vec![0.0; wshape],
        ]);
        let verdict = filter.assess(&ev);
        assert_eq!(verdict.bad_channels, 1);
        assert!(verdict.accepted);

        // Two flat channels: only 1 usable < ncor, rejected
        let ev = event(vec![
            noise_segment(wshape),
            vec![0.0; wshape],
            vec![0.0; wshape],
        ]);
        assert!(!filter.assess(&ev).accepted);
    }

    #[test]
    fn test_partition_preserves_order() {
        let cfg = config();
        let filter = QualityFilter::new(&cfg);
        let wshape = cfg.window.wshape(cfg.station.samprate);

        let good1 = event(vec![noise_segment(wshape)]);
        let bad = event(vec![vec![0.0; wshape]]);
        let mut good2 = event(vec![noise_segment(wshape)]);
        good2.trigger_time = 200.0;

        let (accepted, rejected) = filter.partition(vec![good1, bad, good2]);
        assert_eq!(accepted.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert!(accepted[0].trigger_time < accepted[1].trigger_time);
    }
}
