//! Resource providers for fontfall.
//!
//! This crate provides the platform-specific implementations of the
//! `ResourceProvider` trait from fontfall-traits, and the [`SourceResolver`]
//! that routes a variant path to the right one.
//!
//! ## Available Providers
//!
//! - [`FilesystemResourceProvider`]: Loads fonts from the local filesystem
//! - [`HttpResourceProvider`]: Fetches `http://` and `https://` URLs
//!
//! ## Re-exports
//!
//! For convenience, we also re-export the in-memory provider from fontfall-traits:
//! - [`InMemoryResourceProvider`]: Pre-populated in-memory storage

mod filesystem;
mod http;
mod resolver;
mod storage;

pub use filesystem::FilesystemResourceProvider;
pub use http::HttpResourceProvider;
pub use resolver::SourceResolver;
pub use storage::probe_storage;

// Re-export the in-memory provider from fontfall-traits for convenience
pub use fontfall_traits::InMemoryResourceProvider;
