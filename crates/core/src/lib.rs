//! # fontfall-core
//!
//! Platform-agnostic fallback metric synthesis:
//! - **container**: WOFF/WOFF2 unwrapping to plain sfnt
//! - **parser**: font metadata extraction backed by `ttf-parser`
//! - **select**: deterministic choice of one representative variant
//! - **synth**: CSS override arithmetic against a fixed reference table
//! - **fingerprint**: stable cache keys for a collection's variants
//! - **cache**: file-per-fingerprint storage with a pass-through mode
//!
//! ## Design Principle
//!
//! Nothing here talks to the network or needs an async runtime. Byte
//! loading lives in fontfall-resource, sequencing in the `fontfall` crate.

pub mod cache;
pub mod container;
pub mod error;
pub mod fingerprint;
pub mod parser;
pub mod select;
pub mod synth;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{CacheKey, CacheRoot, FingerprintCache, PutOutcome};
pub use error::{CacheError, MetricsError};
pub use fingerprint::Fingerprint;
pub use parser::TtfMetadataParser;
pub use select::{Candidate, SelectionPolicy, select_representative};
pub use synth::{ReferenceFont, reference_font, synthesize};

// Re-export foundation crates
pub use fontfall_traits as traits;
pub use fontfall_types as types;
