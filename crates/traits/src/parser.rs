//! FontMetadataParser trait: raw font bytes in, metrics record out.

use fontfall_types::ParsedFontMetadata;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FontParseError {
    #[error("Bytes are not a recognized font: {0}")]
    UnrecognizedFormat(String),

    #[error("Font has degenerate metrics: {0}")]
    Degenerate(String),
}

/// Extracts [`ParsedFontMetadata`] from font binaries.
///
/// Implementations must be pure: the same bytes always produce the same
/// record or the same error.
pub trait FontMetadataParser: Send + Sync + Debug {
    fn parse(&self, data: &[u8]) -> Result<ParsedFontMetadata, FontParseError>;

    /// Returns a human-readable name for this parser (for logging/debugging).
    fn name(&self) -> &'static str;
}
