//! Detection of a usable local storage layer.

use crate::filesystem::FilesystemResourceProvider;
use log::{debug, warn};

/// Probes for local storage once, returning a filesystem provider rooted at
/// the working directory.
///
/// Returns `None` on targets without a filesystem (wasm32) and when the
/// working directory cannot be determined, e.g. inside a sandbox that hides
/// it. Absence is an ordinary outcome: local variants then resolve to
/// nothing instead of failing.
pub fn probe_storage() -> Option<FilesystemResourceProvider> {
    if cfg!(target_arch = "wasm32") {
        debug!("[RESOLVE] No filesystem on this target, local fonts are unavailable.");
        return None;
    }

    match std::env::current_dir() {
        Ok(cwd) => {
            debug!("[RESOLVE] Local storage available at {}", cwd.display());
            Some(FilesystemResourceProvider::new(cwd))
        }
        Err(e) => {
            warn!("[RESOLVE] Working directory is not accessible ({}), local fonts are unavailable.", e);
            None
        }
    }
}
