// src/detect/mod.rs
//! Trigger detection and signal-quality pipeline stages

pub mod coincidence;
pub mod extractor;
pub mod picker;
pub mod quality;
pub mod stalta;
pub mod stats;

pub use coincidence::{CandidateTrigger, CoincidenceDetector};
pub use extractor::{ChannelSegment, EventVector, Extraction, RunState, TriggerExtractor};
pub use picker::AicPicker;
pub use quality::{ChannelQuality, EventQuality, QualityFilter};
pub use stalta::{classic_sta_lta, trigger_onset, OnsetSpan};
