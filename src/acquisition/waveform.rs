// src/acquisition/waveform.rs
//! Core waveform types shared by acquisition and detection

use serde::{Deserialize, Serialize};
use std::fmt;

use super::AcquireError;

/// Fully qualified channel identity (network, station, location, channel)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl ChannelId {
    /// Build a channel identity from its four code components
    pub fn new(network: &str, station: &str, location: &str, channel: &str) -> Self {
        Self {
            network: network.to_string(),
            station: station.to_string(),
            location: location.to_string(),
            channel: channel.to_string(),
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

/// One channel's contiguous sample sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub id: ChannelId,
    /// Start time of the first sample, epoch seconds
    pub start: f64,
    /// Native sampling rate in Hz (may differ from the configured rate before correction)
    pub samprate: f64,
    pub data: Vec<f64>,
}

impl Trace {
    /// Zero-filled stand-in for a channel whose data could not be acquired
    pub fn placeholder(id: ChannelId, start: f64, samprate: f64, len: usize) -> Self {
        Self {
            id,
            start,
            samprate,
            data: vec![0.0; len],
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the trace holds no samples
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Multi-channel waveform covering one contiguous time span
///
/// Invariants enforced at construction: at least one trace, all traces share
/// the waveform sampling rate and sample count, and trace order matches the
/// configured channel list. Missing channels are zero-filled placeholders,
/// never omitted.
#[derive(Debug, Clone)]
pub struct Waveform {
    start: f64,
    samprate: f64,
    traces: Vec<Trace>,
}

impl Waveform {
    /// Assemble a waveform from per-channel traces, checking the shared-shape invariant
    pub fn new(start: f64, samprate: f64, traces: Vec<Trace>) -> Result<Self, AcquireError> {
        if traces.is_empty() {
            return Err(AcquireError::InconsistentWaveform {
                reason: "waveform has no traces".to_string(),
            });
        }
        if samprate <= 0.0 {
            return Err(AcquireError::InconsistentWaveform {
                reason: format!("non-positive sampling rate {samprate}"),
            });
        }
        let len = traces[0].len();
        for tr in &traces {
            if tr.len() != len {
                return Err(AcquireError::InconsistentWaveform {
                    reason: format!(
                        "trace {} has {} samples, expected {}",
                        tr.id,
                        tr.len(),
                        len
                    ),
                });
            }
            if (tr.samprate - samprate).abs() > f64::EPSILON {
                return Err(AcquireError::InconsistentWaveform {
                    reason: format!(
                        "trace {} at {} Hz, expected {} Hz",
                        tr.id, tr.samprate, samprate
                    ),
                });
            }
        }
        Ok(Self {
            start,
            samprate,
            traces,
        })
    }

    /// Start time of the first sample, epoch seconds
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Shared sampling rate in Hz
    pub fn samprate(&self) -> f64 {
        self.samprate
    }

    /// Per-channel traces in configured channel order
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Samples per channel
    pub fn len_samples(&self) -> usize {
        self.traces[0].len()
    }

    /// Covered span length in seconds
    pub fn duration(&self) -> f64 {
        self.len_samples() as f64 / self.samprate
    }

    /// End time (one sample period past the last sample), epoch seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration()
    }

    /// Sample index of an absolute time, rounded to the nearest sample
    ///
    /// Negative for times before the waveform start; callers clamp.
    pub fn sample_at(&self, time: f64) -> i64 {
        ((time - self.start) * self.samprate).round() as i64
    }

    /// Absolute time of a sample index
    pub fn time_of(&self, sample: usize) -> f64 {
        self.start + sample as f64 / self.samprate
    }
}
