//! Routes a variant path to the local or remote provider.

use crate::http::HttpResourceProvider;
use crate::storage::probe_storage;
use fontfall_traits::{ResourceError, ResourceProvider, SharedResourceData};
use fontfall_types::is_url;
use log::debug;
use std::sync::Arc;

/// Resolves font paths to bytes.
///
/// URLs go to the remote provider. Everything else goes to the local provider
/// when storage is available; without storage, local paths resolve to `None`.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    local: Option<Arc<dyn ResourceProvider>>,
    remote: Arc<dyn ResourceProvider>,
}

impl SourceResolver {
    pub fn new(local: Option<Arc<dyn ResourceProvider>>, remote: Arc<dyn ResourceProvider>) -> Self {
        Self { local, remote }
    }

    /// Probes local storage and builds an HTTP client.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed.
    pub fn detect() -> Result<Self, ResourceError> {
        let local = probe_storage().map(|p| Arc::new(p) as Arc<dyn ResourceProvider>);
        let remote = Arc::new(HttpResourceProvider::new()?);
        Ok(Self::new(local, remote))
    }

    /// Drops the local provider, as if no storage had been detected.
    pub fn without_storage(mut self) -> Self {
        self.local = None;
        self
    }

    pub fn has_storage(&self) -> bool {
        self.local.is_some()
    }

    /// Returns the bytes behind `path`.
    ///
    /// `Ok(None)` means the font is absent: storage is unavailable or the
    /// local file does not exist. Transport and I/O problems are errors for
    /// this path only.
    pub async fn resolve(&self, path: &str) -> Result<Option<SharedResourceData>, ResourceError> {
        if is_url(path) {
            debug!("[RESOLVE] '{}' via {}", path, self.remote.name());
            return self.remote.load(path).await.map(Some);
        }

        let Some(local) = &self.local else {
            debug!("[RESOLVE] No storage available, '{}' is absent.", path);
            return Ok(None);
        };

        debug!("[RESOLVE] '{}' via {}", path, local.name());
        match local.load(path).await {
            Ok(data) => Ok(Some(data)),
            Err(ResourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
