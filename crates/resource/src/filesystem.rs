//! Filesystem-based resource provider for native platforms.
//!
//! Relative paths are resolved against a root directory, typically the
//! directory the build was started from. Absolute paths are used as-is: font
//! paths come from build configuration, which is trusted input.

use async_trait::async_trait;
use fontfall_traits::{ResourceError, ResourceProvider, SharedResourceData};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A resource provider that loads fonts from the local filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemResourceProvider {
    root: PathBuf,
}

impl FilesystemResourceProvider {
    /// Creates a new filesystem provider resolving relative paths against `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the root directory for relative paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a configured path to the file that will be read.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

#[async_trait]
impl ResourceProvider for FilesystemResourceProvider {
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self.resolve_path(path);

        tokio::fs::read(&full_path)
            .await
            .map(Arc::new)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ResourceError::NotFound(path.to_string())
                } else {
                    ResourceError::LoadFailed {
                        path: full_path.display().to_string(),
                        message: e.to_string(),
                    }
                }
            })
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}
