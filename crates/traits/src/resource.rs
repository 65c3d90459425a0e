//! ResourceProvider trait for abstracting font byte loading.
//!
//! This trait allows the pipeline to obtain font binaries without being tied
//! to a filesystem or a particular HTTP client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Error type for resource loading operations.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Network request for '{url}' failed: {message}")]
    Network { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// A source of raw font bytes.
///
/// # Implementations
///
/// - `FilesystemResourceProvider`: reads local files (fontfall-resource)
/// - `HttpResourceProvider`: fetches `http(s)://` URLs (fontfall-resource)
/// - `InMemoryResourceProvider`: pre-populated map, always available
#[async_trait]
pub trait ResourceProvider: Send + Sync + Debug {
    /// Load a resource by its path or URL.
    ///
    /// Returns `ResourceError::NotFound` when the resource does not exist.
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// An in-memory resource provider.
///
/// Resources must be added before use. Works in any environment, and is the
/// provider of choice for tests.
#[derive(Debug, Default)]
pub struct InMemoryResourceProvider {
    resources: RwLock<HashMap<String, SharedResourceData>>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource under `path`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::LoadFailed` if the internal lock is poisoned.
    pub fn add(&self, path: impl Into<String>, data: Vec<u8>) -> Result<(), ResourceError> {
        let path_string = path.into();
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ResourceError::LoadFailed {
                path: path_string.clone(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources.insert(path_string, Arc::new(data));
        Ok(())
    }

    /// Builder-style variant of [`add`](Self::add) for test setup.
    pub fn with(self, path: impl Into<String>, data: Vec<u8>) -> Self {
        if let Ok(mut resources) = self.resources.write() {
            resources.insert(path.into(), Arc::new(data));
        }
        self
    }

    /// Get the number of resources in the store.
    ///
    /// Returns 0 if the lock is poisoned.
    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.read().map(|r| r.is_empty()).unwrap_or(true)
    }
}

#[async_trait]
impl ResourceProvider for InMemoryResourceProvider {
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resources = self
            .resources
            .read()
            .map_err(|_| ResourceError::LoadFailed {
                path: path.to_string(),
                message: "resource store lock poisoned".to_string(),
            })?;
        resources
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryResourceProvider"
    }
}
