// src/acquisition/simulator.rs
//! Synthetic waveform source for tests, demos, and benchmarks
//!
//! Sample values are a pure function of (seed, channel, absolute sample
//! index), so any two fetch windows agree wherever they overlap. That makes
//! batch-splitting experiments reproducible: adjacent spans see exactly the
//! waveform a single concatenated span would.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::{AcquireError, ChannelId, Trace, WaveformSource};

/// Shape of an injected arrival
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventShape {
    /// Single-sample spike
    Impulse,
    /// Exponentially decaying in-band oscillation, an earthquake-like arrival
    Burst,
    /// Constant-amplitude in-band square wave, a calibration-pulse stand-in
    CalibrationPulse,
}

/// One injected arrival, applied to every requested channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    /// Onset time, epoch seconds
    pub time: f64,
    pub amplitude: f64,
    /// Length of the arrival in seconds (ignored for impulses)
    pub duration: f64,
    pub shape: EventShape,
}

/// Synthetic source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Standard deviation of the Gaussian background noise
    pub noise_amplitude: f64,
    pub seed: u64,
    pub events: Vec<SyntheticEvent>,
    /// Number of initial fetch attempts per channel that fail, for
    /// exercising the retry and placeholder paths
    pub transient_failures: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            noise_amplitude: 1.0,
            seed: 0,
            events: Vec::new(),
            transient_failures: 0,
        }
    }
}

/// Oscillation frequency of burst and calibration shapes, inside the
/// default 1-10 Hz analysis band
const SHAPE_FREQ_HZ: f64 = 5.0;

/// Deterministic synthetic waveform source
pub struct SyntheticSource {
    cfg: SyntheticConfig,
    samprate: f64,
    attempts: Mutex<HashMap<ChannelId, usize>>,
}

impl SyntheticSource {
    /// Create a source delivering traces at `samprate` Hz
    pub fn new(cfg: SyntheticConfig, samprate: f64) -> Self {
        Self {
            cfg,
            samprate,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn noise_at(&self, channel_hash: u64, index: i64) -> f64 {
        let seed = self
            .cfg
            .seed
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add(channel_hash.rotate_left(17))
            .wrapping_add((index as u64).wrapping_mul(0xd134_2543_de82_ef95));
        let mut rng = StdRng::seed_from_u64(seed);
        let v: f64 = rng.sample(StandardNormal);
        self.cfg.noise_amplitude * v
    }

    fn events_at(&self, t: f64) -> f64 {
        let mut value = 0.0;
        for ev in &self.cfg.events {
            let dt = t - ev.time;
            match ev.shape {
                EventShape::Impulse => {
                    if dt.abs() < 0.5 / self.samprate {
                        value += ev.amplitude;
                    }
                }
                EventShape::Burst => {
                    if dt >= 0.0 && dt < ev.duration {
                        let envelope = (-3.0 * dt / ev.duration).exp();
                        value += ev.amplitude
                            * envelope
                            * (2.0 * std::f64::consts::PI * SHAPE_FREQ_HZ * dt).sin();
                    }
                }
                EventShape::CalibrationPulse => {
                    if dt >= 0.0 && dt < ev.duration {
                        let phase = (2.0 * std::f64::consts::PI * SHAPE_FREQ_HZ * dt).sin();
                        value += ev.amplitude * phase.signum();
                    }
                }
            }
        }
        value
    }
}

#[async_trait]
impl WaveformSource for SyntheticSource {
    async fn fetch_channel(
        &self,
        id: &ChannelId,
        start: f64,
        end: f64,
    ) -> Result<Trace, AcquireError> {
        {
            let mut attempts = self.attempts.lock();
            let count = attempts.entry(id.clone()).or_insert(0);
            if *count < self.cfg.transient_failures {
                *count += 1;
                return Err(AcquireError::ChannelUnavailable {
                    id: id.clone(),
                    reason: format!("synthetic transient failure {count}"),
                });
            }
        }

        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let channel_hash = hasher.finish();

        let n = ((end - start) * self.samprate).round() as usize;
        let first = (start * self.samprate).round() as i64;
        let data = (0..n)
            .map(|i| {
                let index = first + i as i64;
                let t = index as f64 / self.samprate;
                self.noise_at(channel_hash, index) + self.events_at(t)
            })
            .collect();

        Ok(Trace {
            id: id.clone(),
            start,
            samprate: self.samprate,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> ChannelId {
        ChannelId::new("UW", "HSR", "--", "EHZ")
    }

    #[tokio::test]
    async fn test_window_consistency() {
        let cfg = SyntheticConfig {
            seed: 42,
            ..SyntheticConfig::default()
        };
        let source = SyntheticSource::new(cfg, 100.0);
        let whole = source.fetch_channel(&id(), 0.0, 100.0).await.unwrap();
        let left = source.fetch_channel(&id(), 0.0, 50.0).await.unwrap();
        let right = source.fetch_channel(&id(), 50.0, 100.0).await.unwrap();

        assert_eq!(&whole.data[..5000], left.data.as_slice());
        assert_eq!(&whole.data[5000..], right.data.as_slice());
    }

    #[tokio::test]
    async fn test_channels_are_decorrelated() {
        let cfg = SyntheticConfig {
            seed: 42,
            ..SyntheticConfig::default()
        };
        let source = SyntheticSource::new(cfg, 100.0);
        let a = source.fetch_channel(&id(), 0.0, 10.0).await.unwrap();
        let other = ChannelId::new("UW", "SHW", "--", "EHZ");
        let b = source.fetch_channel(&other, 0.0, 10.0).await.unwrap();
        assert_ne!(a.data, b.data);
    }

    #[tokio::test]
    async fn test_burst_raises_amplitude() {
        let cfg = SyntheticConfig {
            seed: 42,
            noise_amplitude: 0.1,
            events: vec![SyntheticEvent {
                time: 30.0,
                amplitude: 50.0,
                duration: 4.0,
                shape: EventShape::Burst,
            }],
            ..SyntheticConfig::default()
        };
        let source = SyntheticSource::new(cfg, 100.0);
        let tr = source.fetch_channel(&id(), 0.0, 60.0).await.unwrap();
        let quiet_peak = tr.data[..2900]
            .iter()
            .fold(0.0f64, |m, &x| m.max(x.abs()));
        let loud_peak = tr.data[3000..3400]
            .iter()
            .fold(0.0f64, |m, &x| m.max(x.abs()));
        assert!(loud_peak > 10.0 * quiet_peak);
    }

    #[tokio::test]
    async fn test_transient_failures_expire() {
        let cfg = SyntheticConfig {
            seed: 42,
            transient_failures: 2,
            ..SyntheticConfig::default()
        };
        let source = SyntheticSource::new(cfg, 100.0);
        assert!(source.fetch_channel(&id(), 0.0, 1.0).await.is_err());
        assert!(source.fetch_channel(&id(), 0.0, 1.0).await.is_err());
        assert!(source.fetch_channel(&id(), 0.0, 1.0).await.is_ok());
    }
}
