//! seis-core: seismic trigger detection and signal-quality pipeline
//!
//! This library detects repeating seismic signals in continuous
//! multi-channel waveform data and builds a stream of quality-gated
//! candidate events for an external catalog. It provides:
//!
//! - Coincidence STA/LTA triggering across configurable channel lists
//! - Windowed trigger extraction with cross-run de-duplication state
//! - Kurtosis and robust-outlier quality gating of extracted events
//! - AIC variance-split refinement of arrival times
//! - An acquisition layer with retry, degradation, bandpass, and
//!   resampling policies
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use seis_core::{MemoryCatalog, Pipeline, PipelineConfig, SyntheticConfig, SyntheticSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let samprate = config.station.samprate;
//!     let pipeline = Pipeline::new(config)?;
//!
//!     let source = SyntheticSource::new(SyntheticConfig::default(), samprate);
//!     let catalog = MemoryCatalog::new();
//!
//!     // Scan one hour starting at epoch time 0
//!     let report = pipeline.process_span(&source, &catalog, 0.0, 3600.0).await?;
//!     println!("accepted {} events", report.accepted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acquisition;
pub mod catalog;
pub mod config;
pub mod detect;
pub mod error;
pub mod pipeline;

// Re-export commonly used types for convenience
pub use acquisition::{
    ChannelId, SyntheticConfig, SyntheticEvent, SyntheticSource, Trace, Waveform, WaveformFetcher,
    WaveformSource,
};
pub use catalog::{Catalog, CatalogError, MemoryCatalog};
pub use config::{
    ConfigError, FilterConfig, KurtosisWindow, PipelineConfig, QualityConfig, StageConfig,
    StationConfig, TriggerConfig, WindowConfig,
};
pub use detect::{
    AicPicker, CandidateTrigger, ChannelSegment, CoincidenceDetector, EventVector, QualityFilter,
    RunState, TriggerExtractor,
};
pub use error::{PipelineError, Result};
pub use pipeline::{BatchReport, Pipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "seis-core");
    }
}
