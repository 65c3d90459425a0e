//! # fontfall
//!
//! Synthesizes CSS fallback font overrides (`size-adjust`, `ascent-override`,
//! `descent-override`, `line-gap-override`) so a locally installed generic
//! font occupies the same space as a web font that has not loaded yet.
//!
//! The heavy lifting lives in the workspace crates; this crate sequences it:
//! - `fontfall-resource` obtains font bytes from disk or HTTP
//! - `fontfall-core` parses, selects, synthesizes and caches
//! - [`pipeline`] runs collections concurrently and degrades per variant

pub mod css;
pub mod error;
pub mod localize;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{BuildConfig, CollectionOutcome, FallbackPipeline, PipelineBuilder, PipelineContext};

// Re-export the building blocks callers most often need.
pub use fontfall_core::{Fingerprint, SelectionPolicy};
pub use fontfall_types::{FallbackFamily, FallbackMetrics, FontCollection, FontVariant, FontWeight};
