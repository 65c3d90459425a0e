//! Error types for metric synthesis and cache storage.

use fontfall_traits::FontParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Malformed font metadata: {0}")]
    MalformedMetadata(String),
}

impl From<FontParseError> for MetricsError {
    fn from(e: FontParseError) -> Self {
        MetricsError::MalformedMetadata(e.to_string())
    }
}

/// Cache read/write failure. Always recoverable: callers fall back to
/// recomputing.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache entry serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
