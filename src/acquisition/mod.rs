// src/acquisition/mod.rs
//! Waveform acquisition: source trait, degradation policy, and conditioning
//!
//! Raw samples come from an external source (network client, archive
//! reader, simulator). The fetcher wraps a source and normalizes every
//! channel onto the configured grid: bandpass filter, sampling-rate
//! correction, exact-span trim with zero fill. A channel that fails twice
//! becomes a zero-filled placeholder with a logged warning — acquisition
//! trouble degrades a channel, never the batch.

pub mod bandpass;
pub mod resample;
pub mod simulator;
pub mod waveform;

pub use simulator::{SyntheticConfig, SyntheticEvent, SyntheticSource};
pub use waveform::{ChannelId, Trace, Waveform};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::config::PipelineConfig;

/// Acquisition failures
#[derive(Debug, Clone, Error)]
pub enum AcquireError {
    /// The source could not provide data for a channel
    #[error("no data for {id}: {reason}")]
    ChannelUnavailable { id: ChannelId, reason: String },

    /// A filter band incompatible with the trace sampling rate
    #[error("invalid filter band: {reason}")]
    FilterBand { reason: String },

    /// Traces that cannot form a consistent waveform
    #[error("inconsistent waveform: {reason}")]
    InconsistentWaveform { reason: String },
}

/// External supplier of raw per-channel samples
#[async_trait]
pub trait WaveformSource: Send + Sync {
    /// Fetch one channel's raw samples covering `[start, end)` epoch seconds
    async fn fetch_channel(
        &self,
        id: &ChannelId,
        start: f64,
        end: f64,
    ) -> Result<Trace, AcquireError>;
}

/// Fetches, conditions, and assembles multi-channel waveforms
#[derive(Debug, Clone)]
pub struct WaveformFetcher {
    channels: Vec<ChannelId>,
    samprate: f64,
    fmin: f64,
    fmax: f64,
    atrig: f64,
}

impl WaveformFetcher {
    /// Build a fetcher for the configured channel list and filter band
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            channels: cfg.station.channel_ids(),
            samprate: cfg.station.samprate,
            fmin: cfg.filter.fmin,
            fmax: cfg.filter.fmax,
            atrig: cfg.window.atrig,
        }
    }

    /// Fetch a continuous scanning span, padded by `atrig` seconds on both ends
    pub async fn fetch_span<S: WaveformSource + ?Sized>(
        &self,
        source: &S,
        start: f64,
        duration: f64,
    ) -> Result<Waveform, AcquireError> {
        self.fetch_padded(source, start - self.atrig, start + duration + self.atrig)
            .await
    }

    /// Fetch a short window around a known catalog event time
    pub async fn fetch_event_window<S: WaveformSource + ?Sized>(
        &self,
        source: &S,
        event_time: f64,
    ) -> Result<Waveform, AcquireError> {
        self.fetch_padded(source, event_time - self.atrig, event_time + 3.0 * self.atrig)
            .await
    }

    async fn fetch_padded<S: WaveformSource + ?Sized>(
        &self,
        source: &S,
        from: f64,
        to: f64,
    ) -> Result<Waveform, AcquireError> {
        let n = ((to - from) * self.samprate).round() as usize;
        let mut traces = Vec::with_capacity(self.channels.len());

        for id in &self.channels {
            let trace = match self.fetch_one(source, id, from, to).await {
                Ok(tr) => self.condition(tr, from, n),
                Err(err) => {
                    warn!(channel = %id, error = %err, "channel degraded to placeholder");
                    Trace::placeholder(id.clone(), from, self.samprate, n)
                }
            };
            traces.push(trace);
        }
        Waveform::new(from, self.samprate, traces)
    }

    /// One fetch attempt plus exactly one retry
    async fn fetch_one<S: WaveformSource + ?Sized>(
        &self,
        source: &S,
        id: &ChannelId,
        from: f64,
        to: f64,
    ) -> Result<Trace, AcquireError> {
        match source.fetch_channel(id, from, to).await {
            Ok(tr) => Ok(tr),
            Err(_) => source.fetch_channel(id, from, to).await,
        }
    }

    /// Bandpass at the native rate, correct the rate, fit to the exact span
    fn condition(&self, trace: Trace, from: f64, n: usize) -> Trace {
        let filtered =
            match bandpass::bandpass_zerophase(&trace.data, self.fmin, self.fmax, trace.samprate) {
                Ok(data) => data,
                Err(err) => {
                    warn!(channel = %trace.id, error = %err, "filter failed, channel degraded");
                    return Trace::placeholder(trace.id, from, self.samprate, n);
                }
            };

        let resampled = resample::resample_linear(&filtered, trace.samprate, self.samprate);

        // Place onto the requested grid, zero fill outside the delivered span
        let mut data = vec![0.0; n];
        let offset = ((trace.start - from) * self.samprate).round() as i64;
        for (i, &x) in resampled.iter().enumerate() {
            let at = offset + i as i64;
            if at >= 0 && (at as usize) < n {
                data[at as usize] = x;
            }
        }

        Trace {
            id: trace.id,
            start: from,
            samprate: self.samprate,
            data,
        }
    }
}
