// src/config/mod.rs
//! Pipeline configuration
//!
//! A fixed set of named parameters with defaults, read-only for the whole
//! pipeline. Sections mirror the stages that consume them; every section
//! validates itself and the top-level `validate` adds the cross-section
//! coupling rules.

pub mod constants;
pub mod loader;

pub use loader::ConfigError;

use serde::{Deserialize, Serialize};

use crate::acquisition::waveform::ChannelId;
use constants::{filter, quality, station, trigger, window};

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub stages: StageConfig,
}

/// Station identity and sampling
///
/// The four code lists are parallel: entry `n` of each names channel `n`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default = "defaults::network")]
    pub network: Vec<String>,
    #[serde(default = "defaults::station")]
    pub station: Vec<String>,
    #[serde(default = "defaults::location")]
    pub location: Vec<String>,
    #[serde(default = "defaults::channel")]
    pub channel: Vec<String>,
    #[serde(default = "defaults::samprate")]
    pub samprate: f64,
}

/// STA/LTA coincidence triggering thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "defaults::lwin")]
    pub lwin: f64,
    #[serde(default = "defaults::swin")]
    pub swin: f64,
    #[serde(default = "defaults::trigon")]
    pub trigon: f64,
    #[serde(default = "defaults::trigoff")]
    pub trigoff: f64,
    #[serde(default = "defaults::mintrig")]
    pub mintrig: f64,
    #[serde(default = "defaults::nsta_coincidence")]
    pub nsta_coincidence: usize,
}

/// Event windowing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "defaults::winlen")]
    pub winlen: usize,
    #[serde(default = "defaults::ptrig")]
    pub ptrig: f64,
    #[serde(default = "defaults::atrig")]
    pub atrig: f64,
}

/// Acquisition bandpass corners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "defaults::fmin")]
    pub fmin: f64,
    #[serde(default = "defaults::fmax")]
    pub fmax: f64,
}

/// Which part of a segment feeds the time-domain kurtosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KurtosisWindow {
    /// Centered `kurtwin`-second sub-window around the trigger point
    Windowed,
    /// Full channel segment
    Whole,
}

/// Quality-filter thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "defaults::kurtwin")]
    pub kurtwin: f64,
    #[serde(default = "defaults::kurtmax")]
    pub kurtmax: f64,
    #[serde(default = "defaults::kurtfmax")]
    pub kurtfmax: f64,
    #[serde(default = "defaults::oratiomax")]
    pub oratiomax: f64,
    #[serde(default = "defaults::ncor")]
    pub ncor: usize,
    #[serde(default = "defaults::kurtosis_window")]
    pub kurtosis_window: KurtosisWindow,
}

/// Optional stage switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Run the AIC arrival refiner on accepted events
    #[serde(default = "defaults::refine_picks")]
    pub refine_picks: bool,
}

mod defaults {
    use super::*;

    pub fn network() -> Vec<String> {
        vec![station::DEFAULT_NETWORK.to_string()]
    }
    pub fn station() -> Vec<String> {
        vec![station::DEFAULT_STATION.to_string()]
    }
    pub fn location() -> Vec<String> {
        vec![station::DEFAULT_LOCATION.to_string()]
    }
    pub fn channel() -> Vec<String> {
        vec![station::DEFAULT_CHANNEL.to_string()]
    }
    pub fn samprate() -> f64 {
        station::DEFAULT_SAMPRATE_HZ
    }

    pub fn lwin() -> f64 {
        trigger::DEFAULT_LWIN_S
    }
    pub fn swin() -> f64 {
        trigger::DEFAULT_SWIN_S
    }
    pub fn trigon() -> f64 {
        trigger::DEFAULT_TRIGON
    }
    pub fn trigoff() -> f64 {
        trigger::DEFAULT_TRIGOFF
    }
    pub fn mintrig() -> f64 {
        trigger::DEFAULT_MINTRIG_S
    }
    pub fn nsta_coincidence() -> usize {
        trigger::DEFAULT_NSTA_COINCIDENCE
    }

    pub fn winlen() -> usize {
        window::DEFAULT_WINLEN
    }
    pub fn ptrig() -> f64 {
        window::DEFAULT_PTRIG_S
    }
    pub fn atrig() -> f64 {
        window::DEFAULT_ATRIG_S
    }

    pub fn fmin() -> f64 {
        filter::DEFAULT_FMIN_HZ
    }
    pub fn fmax() -> f64 {
        filter::DEFAULT_FMAX_HZ
    }

    pub fn kurtwin() -> f64 {
        quality::DEFAULT_KURTWIN_S
    }
    pub fn kurtmax() -> f64 {
        quality::DEFAULT_KURTMAX
    }
    pub fn kurtfmax() -> f64 {
        quality::DEFAULT_KURTFMAX
    }
    pub fn oratiomax() -> f64 {
        quality::DEFAULT_ORATIOMAX
    }
    pub fn ncor() -> usize {
        quality::DEFAULT_NCOR
    }
    pub fn kurtosis_window() -> KurtosisWindow {
        KurtosisWindow::Windowed
    }

    pub fn refine_picks() -> bool {
        true
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            network: defaults::network(),
            station: defaults::station(),
            location: defaults::location(),
            channel: defaults::channel(),
            samprate: defaults::samprate(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            lwin: defaults::lwin(),
            swin: defaults::swin(),
            trigon: defaults::trigon(),
            trigoff: defaults::trigoff(),
            mintrig: defaults::mintrig(),
            nsta_coincidence: defaults::nsta_coincidence(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            winlen: defaults::winlen(),
            ptrig: defaults::ptrig(),
            atrig: defaults::atrig(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            fmin: defaults::fmin(),
            fmax: defaults::fmax(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            kurtwin: defaults::kurtwin(),
            kurtmax: defaults::kurtmax(),
            kurtfmax: defaults::kurtfmax(),
            oratiomax: defaults::oratiomax(),
            ncor: defaults::ncor(),
            kurtosis_window: defaults::kurtosis_window(),
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            refine_picks: defaults::refine_picks(),
        }
    }
}

impl StationConfig {
    /// Number of configured channels
    pub fn nsta(&self) -> usize {
        self.station.len()
    }

    /// Channel identities in configured order
    pub fn channel_ids(&self) -> Vec<ChannelId> {
        (0..self.nsta())
            .map(|n| {
                ChannelId::new(
                    &self.network[n],
                    &self.station[n],
                    &self.location[n],
                    &self.channel[n],
                )
            })
            .collect()
    }
}

impl WindowConfig {
    /// Samples per channel segment, derived once from the cut lengths
    ///
    /// The event-vector shape is a fixed invariant of the configuration,
    /// never re-derived per event.
    pub fn wshape(&self, samprate: f64) -> usize {
        ((self.ptrig + self.atrig) * samprate).round() as usize
    }
}

/// Validate a complete configuration
pub fn validate_config(cfg: &PipelineConfig) -> Result<(), String> {
    let st = &cfg.station;
    let n = st.station.len();
    if n == 0 {
        return Err("station list must not be empty".to_string());
    }
    if st.network.len() != n || st.location.len() != n || st.channel.len() != n {
        return Err("network/station/location/channel lists must have equal length".to_string());
    }
    if !(station::MIN_SAMPRATE_HZ..=station::MAX_SAMPRATE_HZ).contains(&st.samprate) {
        return Err(format!(
            "samprate must be within [{}, {}] Hz",
            station::MIN_SAMPRATE_HZ,
            station::MAX_SAMPRATE_HZ
        ));
    }

    let tg = &cfg.trigger;
    if tg.swin <= 0.0 || tg.lwin <= tg.swin {
        return Err("lwin must exceed swin and both must be positive".to_string());
    }
    if tg.trigoff >= tg.trigon {
        return Err("trigoff must be below trigon".to_string());
    }
    if tg.mintrig < 0.0 {
        return Err("mintrig must not be negative".to_string());
    }
    if tg.nsta_coincidence == 0 || tg.nsta_coincidence > n {
        return Err("nsta_coincidence must be within [1, channel count]".to_string());
    }

    let wd = &cfg.window;
    if wd.ptrig <= 0.0 || wd.atrig <= 0.0 {
        return Err("ptrig and atrig must be positive".to_string());
    }
    if wd.ptrig > wd.atrig {
        return Err("ptrig must not exceed atrig".to_string());
    }
    if wd.winlen == 0 || wd.winlen > wd.wshape(st.samprate) {
        return Err("winlen must be within [1, wshape]".to_string());
    }

    let fl = &cfg.filter;
    if fl.fmin <= 0.0 || fl.fmax <= fl.fmin {
        return Err("filter band requires 0 < fmin < fmax".to_string());
    }
    if fl.fmax >= st.samprate / 2.0 {
        return Err("fmax must be below the Nyquist frequency".to_string());
    }

    let q = &cfg.quality;
    if q.kurtwin <= 0.0 || q.kurtwin / 2.0 > wd.ptrig {
        return Err("kurtwin must be positive and fit before the trigger point".to_string());
    }
    if q.kurtmax <= 0.0 || q.kurtfmax <= 0.0 {
        return Err("kurtosis thresholds must be positive".to_string());
    }
    if !(0.0..=1.0).contains(&q.oratiomax) {
        return Err("oratiomax must be within [0, 1]".to_string());
    }
    if q.ncor == 0 || q.ncor > n {
        return Err("ncor must be within [1, channel count]".to_string());
    }

    Ok(())
}
