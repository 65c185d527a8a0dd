// src/detect/extractor.rs
//! Windowed trigger extraction with cross-run de-duplication state
//!
//! The extractor is the pipeline's only stateful stage. The persisted
//! "last accepted trigger time" is threaded through explicitly: the previous
//! value comes in as a parameter and the updated value goes out with the
//! extracted events, so the caller owns persistence and invocations stay
//! serializable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquisition::{ChannelId, Waveform};
use crate::config::PipelineConfig;
use crate::detect::coincidence::CandidateTrigger;
use crate::detect::stats;

/// Persisted boundary before which no new trigger may be accepted
///
/// `None` means no prior trigger and is treated as far in the past.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunState(Option<f64>);

impl RunState {
    /// No prior trigger
    pub fn none() -> Self {
        Self(None)
    }

    /// Boundary at an absolute trigger time, epoch seconds
    pub fn at(time: f64) -> Self {
        Self(Some(time))
    }

    /// Absolute time of the last accepted trigger, if any
    pub fn last_trigger(&self) -> Option<f64> {
        self.0
    }
}

/// One channel's fixed-length, demeaned event window
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSegment {
    pub id: ChannelId,
    pub data: Vec<f64>,
}

/// The unit the quality filter and arrival refiner operate on
///
/// Segments keep their channel identity and configured order; the flat
/// concatenated form is derived on demand so reordered channel lists can
/// never silently misalign downstream consumers.
#[derive(Debug, Clone)]
pub struct EventVector {
    /// Trigger time, epoch seconds
    pub trigger_time: f64,
    /// Maximum STA/LTA ratio reported by the coincidence detector
    pub peak_ratio: f64,
    /// Refined onset sample within each segment, set by the arrival refiner
    pub refined_onset: Option<usize>,
    /// Per-channel windows in configured channel order
    pub segments: Vec<ChannelSegment>,
}

impl EventVector {
    /// Segments concatenated in configured channel order
    pub fn concatenated(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.segments.iter().map(|s| s.data.len()).sum());
        for seg in &self.segments {
            out.extend_from_slice(&seg.data);
        }
        out
    }

    /// Segment for a channel identity, if present
    pub fn segment(&self, id: &ChannelId) -> Option<&ChannelSegment> {
        self.segments.iter().find(|s| &s.id == id)
    }
}

/// Extractor output: accepted events plus the state to persist
#[derive(Debug)]
pub struct Extraction {
    pub events: Vec<EventVector>,
    pub next_state: RunState,
}

/// Applies margin and spacing rules to candidates and slices event windows
#[derive(Debug, Clone)]
pub struct TriggerExtractor {
    ptrig: f64,
    atrig: f64,
    mintrig: f64,
    wshape: usize,
}

impl TriggerExtractor {
    /// Build an extractor; the event-window length `wshape` is derived once
    /// from the configuration
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            ptrig: cfg.window.ptrig,
            atrig: cfg.window.atrig,
            mintrig: cfg.trigger.mintrig,
            wshape: cfg.window.wshape(cfg.station.samprate),
        }
    }

    /// Samples per channel segment
    pub fn wshape(&self) -> usize {
        self.wshape
    }

    /// Process candidates in time order against the previous run state
    ///
    /// The returned state is computed exactly once per invocation: the last
    /// accepted trigger time when any candidate was accepted, otherwise the
    /// end of the scanned span minus the re-trigger spacing so the next
    /// invocation neither re-scans nor duplicates this span.
    pub fn extract(
        &self,
        waveform: &Waveform,
        candidates: &[CandidateTrigger],
        prev: RunState,
    ) -> Extraction {
        let t = waveform.start();
        let duration = waveform.duration();

        // Seconds from waveform start to the previous accepted trigger;
        // with no prior state the first candidate always clears the spacing check
        let mut ptime = prev
            .last_trigger()
            .map(|ts| ts - t)
            .unwrap_or(-self.mintrig);

        let mut events = Vec::new();
        for cand in candidates {
            let ttime = cand.time;
            if ttime < t + self.atrig {
                debug!(time = ttime, "candidate inside start margin, skipped");
                continue;
            }
            if ttime >= t + duration - 2.0 * self.atrig {
                debug!(time = ttime, "candidate inside end margin, skipped");
                continue;
            }
            if ttime < t + ptime + self.mintrig {
                debug!(time = ttime, "candidate within re-trigger spacing, skipped");
                continue;
            }

            ptime = ttime - t;
            events.push(self.slice_event(waveform, cand));
        }

        let next_state = if events.is_empty() {
            RunState::at(t + duration - self.mintrig)
        } else {
            RunState::at(t + ptime)
        };
        Extraction { events, next_state }
    }

    fn slice_event(&self, waveform: &Waveform, cand: &CandidateTrigger) -> EventVector {
        let start_idx = waveform.sample_at(cand.time - self.ptrig).max(0) as usize;

        let segments = waveform
            .traces()
            .iter()
            .map(|trace| {
                let end = (start_idx + self.wshape).min(trace.data.len());
                let mut data = Vec::with_capacity(self.wshape);
                data.extend_from_slice(&trace.data[start_idx.min(end)..end]);
                data.resize(self.wshape, 0.0);

                let m = stats::mean(&data);
                for x in &mut data {
                    *x -= m;
                }
                ChannelSegment {
                    id: trace.id.clone(),
                    data,
                }
            })
            .collect();

        EventVector {
            trigger_time: cand.time,
            peak_ratio: cand.peak_ratio,
            refined_onset: None,
            segments,
        }
    }
}
