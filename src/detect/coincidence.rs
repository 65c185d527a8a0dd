// src/detect/coincidence.rs
//! Multi-channel coincidence triggering on STA/LTA characteristic functions

use rayon::prelude::*;

use crate::acquisition::Waveform;
use crate::config::TriggerConfig;
use crate::detect::stalta::{classic_sta_lta, trigger_onset, OnsetSpan};

/// Candidate trigger scoped to one detector invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateTrigger {
    /// Earliest coincident on-time, epoch seconds
    pub time: f64,
    /// Maximum STA/LTA ratio across participating channels during the on-period
    pub peak_ratio: f64,
}

/// Per-channel onset annotated with its peak ratio
#[derive(Debug, Clone, Copy)]
struct ChannelOnset {
    channel: usize,
    span: OnsetSpan,
    peak: f64,
}

/// STA/LTA coincidence detector over a multi-channel waveform
///
/// A candidate fires where at least `nsta_coincidence` distinct channels are
/// simultaneously on; overlapping per-channel on-periods are clustered into
/// one candidate. No channel reaching the on threshold yields an empty
/// sequence, which is not an error.
#[derive(Debug, Clone)]
pub struct CoincidenceDetector {
    swin: f64,
    lwin: f64,
    trigon: f64,
    trigoff: f64,
    min_channels: usize,
}

impl CoincidenceDetector {
    /// Build a detector from the trigger configuration
    pub fn new(cfg: &TriggerConfig) -> Self {
        Self {
            swin: cfg.swin,
            lwin: cfg.lwin,
            trigon: cfg.trigon,
            trigoff: cfg.trigoff,
            min_channels: cfg.nsta_coincidence,
        }
    }

    /// Report candidate triggers in time order
    pub fn detect(&self, waveform: &Waveform) -> Vec<CandidateTrigger> {
        let sr = waveform.samprate();
        let nsta = ((self.swin * sr).round() as usize).max(1);
        let nlta = ((self.lwin * sr).round() as usize).max(nsta + 1);

        // Per-channel characteristic functions are independent
        let mut onsets: Vec<ChannelOnset> = waveform
            .traces()
            .par_iter()
            .enumerate()
            .flat_map_iter(|(channel, trace)| {
                let cft = classic_sta_lta(&trace.data, nsta, nlta);
                trigger_onset(&cft, self.trigon, self.trigoff)
                    .into_iter()
                    .map(|span| {
                        let peak = cft[span.on..=span.off]
                            .iter()
                            .cloned()
                            .fold(f64::NEG_INFINITY, f64::max);
                        ChannelOnset {
                            channel,
                            span,
                            peak,
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        onsets.sort_by_key(|o| o.span.on);
        self.cluster(waveform, &onsets)
    }

    /// Merge overlapping per-channel onsets and keep clusters with enough
    /// distinct channels
    fn cluster(&self, waveform: &Waveform, onsets: &[ChannelOnset]) -> Vec<CandidateTrigger> {
        let nchan = waveform.traces().len();
        let mut candidates = Vec::new();
        let mut i = 0;

        while i < onsets.len() {
            let first = onsets[i];
            let mut cluster_off = first.span.off;
            let mut peak = first.peak;
            let mut seen = vec![false; nchan];
            seen[first.channel] = true;
            let mut members = 1usize;

            let mut j = i + 1;
            while j < onsets.len() && onsets[j].span.on <= cluster_off {
                cluster_off = cluster_off.max(onsets[j].span.off);
                peak = peak.max(onsets[j].peak);
                if !seen[onsets[j].channel] {
                    seen[onsets[j].channel] = true;
                    members += 1;
                }
                j += 1;
            }

            if members >= self.min_channels {
                candidates.push(CandidateTrigger {
                    time: waveform.time_of(first.span.on),
                    peak_ratio: peak,
                });
            }
            i = j;
        }
        candidates
    }
}
