//! Shared data types for fontfall.
//!
//! These are plain, immutable records passed between the resolver, the
//! metadata parser, the selector, the synthesizer and the cache. None of them
//! perform I/O.

pub mod collection;
pub mod format;
pub mod metrics;
pub mod weight;

pub use collection::{FallbackFamily, FontCollection, FontVariant, is_url};
pub use format::{FontFormat, FormatError};
pub use metrics::{FallbackMetrics, ParsedFontMetadata};
pub use weight::FontWeight;
