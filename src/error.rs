// src/error.rs
//! Unified error type for pipeline operations
//!
//! Module-level errors (`AcquireError`, `CatalogError`, `ConfigError`)
//! convert into one `PipelineError` so callers handle a single type at the
//! batch boundary.

use thiserror::Error;

use crate::acquisition::AcquireError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Any failure surfaced by a pipeline invocation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquireError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
