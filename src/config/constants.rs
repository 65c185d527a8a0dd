// src/config/constants.rs
//! Default values and limits for the configuration surface

/// Station and channel defaults
pub mod station {
    pub const DEFAULT_NETWORK: &str = "UW";
    pub const DEFAULT_STATION: &str = "HSR";
    pub const DEFAULT_LOCATION: &str = "--";
    pub const DEFAULT_CHANNEL: &str = "EHZ";
    pub const DEFAULT_SAMPRATE_HZ: f64 = 100.0;
    pub const MIN_SAMPRATE_HZ: f64 = 1.0;
    pub const MAX_SAMPRATE_HZ: f64 = 1000.0;
}

/// STA/LTA triggering defaults
pub mod trigger {
    /// Long window length in seconds
    pub const DEFAULT_LWIN_S: f64 = 7.0;
    /// Short window length in seconds
    pub const DEFAULT_SWIN_S: f64 = 0.8;
    /// Ratio at which a channel turns on
    pub const DEFAULT_TRIGON: f64 = 3.0;
    /// Ratio below which a channel turns off again
    pub const DEFAULT_TRIGOFF: f64 = 2.0;
    /// Minimum spacing between accepted triggers in seconds
    pub const DEFAULT_MINTRIG_S: f64 = 10.0;
    /// Channels that must be simultaneously on
    pub const DEFAULT_NSTA_COINCIDENCE: usize = 1;
}

/// Event windowing defaults
pub mod window {
    /// Correlation window length in samples, power of two preferred
    pub const DEFAULT_WINLEN: usize = 512;
    /// Seconds cut before the trigger
    pub const DEFAULT_PTRIG_S: f64 = 10.0;
    /// Seconds cut after the trigger, also the acquisition padding margin
    pub const DEFAULT_ATRIG_S: f64 = 20.0;
}

/// Bandpass filter defaults
pub mod filter {
    pub const DEFAULT_FMIN_HZ: f64 = 1.0;
    pub const DEFAULT_FMAX_HZ: f64 = 10.0;
}

/// Quality-filter defaults
pub mod quality {
    /// Seconds of the centered kurtosis sub-window
    pub const DEFAULT_KURTWIN_S: f64 = 5.0;
    /// Time-domain kurtosis threshold
    pub const DEFAULT_KURTMAX: f64 = 80.0;
    /// Spectral kurtosis threshold
    pub const DEFAULT_KURTFMAX: f64 = 150.0;
    /// Outlier-ratio threshold
    pub const DEFAULT_ORATIOMAX: f64 = 0.06;
    /// Channels that must stay usable for downstream correlation
    pub const DEFAULT_NCOR: usize = 1;
}
