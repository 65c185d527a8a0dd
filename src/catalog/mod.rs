// src/catalog/mod.rs
//! Catalog storage interface
//!
//! The pipeline produces to an external catalog: accepted events are
//! appended and the run state is read at the start and written exactly once
//! at the end of every invocation. A missing prior state is `RunState::none`,
//! never an error, so a fresh catalog starts processing immediately.

use parking_lot::Mutex;
use thiserror::Error;

use crate::detect::extractor::{EventVector, RunState};

/// Catalog storage failures
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("catalog write failed: {0}")]
    WriteFailed(String),
}

/// Persistent store for accepted events and the run state
///
/// Implementations must treat the run state as a single-writer transactional
/// value; the caller serializes invocations over overlapping spans.
pub trait Catalog: Send + Sync {
    /// Append one accepted event with its metadata
    fn append_event(&self, event: &EventVector) -> Result<(), CatalogError>;

    /// Last persisted run state, `RunState::none()` on a fresh catalog
    fn read_run_state(&self) -> Result<RunState, CatalogError>;

    /// Persist the run state for the next invocation
    fn write_run_state(&self, state: RunState) -> Result<(), CatalogError>;
}

#[derive(Debug, Default)]
struct MemoryCatalogInner {
    events: Vec<EventVector>,
    run_state: RunState,
}

/// In-memory catalog for tests and single-process runs
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: Mutex<MemoryCatalogInner>,
}

impl MemoryCatalog {
    /// Fresh catalog with no events and no run state
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all stored events
    pub fn events(&self) -> Vec<EventVector> {
        self.inner.lock().events.clone()
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    /// True when no events are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Catalog for MemoryCatalog {
    fn append_event(&self, event: &EventVector) -> Result<(), CatalogError> {
        self.inner.lock().events.push(event.clone());
        Ok(())
    }

    fn read_run_state(&self) -> Result<RunState, CatalogError> {
        Ok(self.inner.lock().run_state)
    }

    fn write_run_state(&self, state: RunState) -> Result<(), CatalogError> {
        self.inner.lock().run_state = state;
        Ok(())
    }
}
