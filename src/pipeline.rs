// src/pipeline.rs
//! Batch orchestration of the detection pipeline
//!
//! Each invocation covers one contiguous span and runs to completion:
//! read run state, fetch, detect, extract, quality-gate, optionally refine,
//! append accepted events, write run state exactly once. The run state
//! encodes an ordering dependency across invocations, so callers must not
//! process overlapping spans concurrently.

use tracing::info;

use crate::acquisition::{WaveformFetcher, WaveformSource};
use crate::catalog::Catalog;
use crate::config::{validate_config, ConfigError, PipelineConfig};
use crate::detect::{
    AicPicker, CoincidenceDetector, QualityFilter, RunState, TriggerExtractor,
};
use crate::error::Result;

/// Outcome summary of one processed span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchReport {
    /// Requested span start, epoch seconds
    pub span_start: f64,
    /// Requested span length in seconds
    pub span_duration: f64,
    /// Candidates reported by the coincidence detector
    pub candidates: usize,
    /// Events surviving margins and spacing
    pub extracted: usize,
    /// Events accepted by the quality filter and appended to the catalog
    pub accepted: usize,
    /// Events rejected by the quality filter
    pub rejected: usize,
    /// Run state persisted at the end of the invocation
    pub run_state: RunState,
}

/// The assembled detection pipeline
pub struct Pipeline {
    config: PipelineConfig,
    fetcher: WaveformFetcher,
    detector: CoincidenceDetector,
    extractor: TriggerExtractor,
    quality: QualityFilter,
    picker: AicPicker,
}

impl Pipeline {
    /// Validate the configuration and assemble all stages
    pub fn new(config: PipelineConfig) -> Result<Self> {
        validate_config(&config).map_err(ConfigError::ValidationError)?;
        Ok(Self {
            fetcher: WaveformFetcher::new(&config),
            detector: CoincidenceDetector::new(&config.trigger),
            extractor: TriggerExtractor::new(&config),
            quality: QualityFilter::new(&config),
            picker: AicPicker::new(&config),
            config,
        })
    }

    /// The configuration the pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one contiguous span and persist the resulting run state
    ///
    /// Returns a report; accepted events have already been appended to the
    /// catalog when this returns.
    pub async fn process_span<S, C>(
        &self,
        source: &S,
        catalog: &C,
        start: f64,
        duration: f64,
    ) -> Result<BatchReport>
    where
        S: WaveformSource + ?Sized,
        C: Catalog + ?Sized,
    {
        let prev_state = catalog.read_run_state()?;
        let waveform = self.fetcher.fetch_span(source, start, duration).await?;

        let candidates = self.detector.detect(&waveform);
        let extraction = self.extractor.extract(&waveform, &candidates, prev_state);
        let extracted = extraction.events.len();

        let (mut accepted, rejected) = self.quality.partition(extraction.events);

        if self.config.stages.refine_picks {
            let trigger_offset = (self.config.window.ptrig * self.config.station.samprate)
                .round() as usize;
            for event in &mut accepted {
                // Refine on the first channel; None keeps the unrefined pick
                event.refined_onset = event
                    .segments
                    .first()
                    .and_then(|seg| self.picker.refine(&seg.data, trigger_offset));
            }
        }

        for event in &accepted {
            catalog.append_event(event)?;
        }
        catalog.write_run_state(extraction.next_state)?;

        let report = BatchReport {
            span_start: start,
            span_duration: duration,
            candidates: candidates.len(),
            extracted,
            accepted: accepted.len(),
            rejected: rejected.len(),
            run_state: extraction.next_state,
        };
        info!(
            start = report.span_start,
            duration = report.span_duration,
            candidates = report.candidates,
            accepted = report.accepted,
            rejected = report.rejected,
            "span processed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_invalid_config_rejected_at_assembly() {
        let mut cfg = PipelineConfig::default();
        cfg.trigger.trigoff = 9.0;
        assert!(Pipeline::new(cfg).is_err());
    }

    #[test]
    fn test_valid_config_assembles() {
        let p = Pipeline::new(PipelineConfig::default()).unwrap();
        assert_eq!(p.config().station.nsta(), 1);
    }
}
