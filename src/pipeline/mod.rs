//! Fallback metric pipeline orchestration.
//!
//! - [`PipelineBuilder`]: Fluent builder that runs the capability probes
//! - [`FallbackPipeline`]: Resolves, parses, selects, synthesizes and caches
//! - [`BuildConfig`]: JSON configuration listing font collections
//!
//! # Example
//!
//! ```ignore
//! use fontfall::{BuildConfig, PipelineBuilder};
//!
//! let config = BuildConfig::from_file("fontfall.json")?;
//! let pipeline = PipelineBuilder::new().build()?;
//! let outcomes = pipeline.run_all(&config.collections).await;
//! ```

mod builder;
pub mod config;
pub mod context;
mod orchestrator;

// Core public API
pub use builder::PipelineBuilder;
pub use config::BuildConfig;
pub use context::PipelineContext;
pub use orchestrator::{CollectionOutcome, FallbackPipeline};
