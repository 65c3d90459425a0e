// src/error.rs
use fontfall_traits::ResourceError;
use fontfall_types::FormatError;
use thiserror::Error;

/// Top-level error for building and configuring the fallback pipeline.
///
/// Per-variant and per-collection failures of metric generation never
/// surface here; they degrade to an absent result. Configuration mistakes
/// and fonts that must be embedded but cannot be loaded are reported.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Unsupported font source: {0}")]
    Format(#[from] FormatError),
}
