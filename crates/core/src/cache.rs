//! File-per-fingerprint storage for synthesized metrics.
//!
//! Layout: `<dir>/<fingerprint>-<fallback>[-kw].json`, each file a flat JSON
//! object holding one [`FallbackMetrics`]. There is no index; a file's
//! existence is the only metadata. Entries are never evicted or revalidated.

use crate::error::CacheError;
use crate::fingerprint::Fingerprint;
use crate::select::SelectionPolicy;
use fontfall_types::{FallbackFamily, FallbackMetrics};
use log::{debug, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Subdirectory created under a probed temp location.
pub const CACHE_DIR_NAME: &str = "fontfall-cache";
/// Extension of cache entry files.
pub const ENTRY_EXTENSION: &str = "json";

static PROBE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Where cache entries live for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRoot {
    Directory(PathBuf),
    /// No writable location: every lookup misses, every write is skipped.
    PassThrough,
}

impl CacheRoot {
    /// Probes the OS temp locations and picks the first writable one.
    pub fn probe() -> Self {
        Self::probe_locations(&default_probe_locations())
    }

    /// Probes `locations` in order by creating and removing a marker
    /// directory in each.
    pub fn probe_locations(locations: &[PathBuf]) -> Self {
        for location in locations {
            if is_writable(location) {
                let root = location.join(CACHE_DIR_NAME);
                debug!("[CACHE] Using cache root {}", root.display());
                return CacheRoot::Directory(root);
            }
            debug!("[CACHE] {} is not writable", location.display());
        }
        warn!("[CACHE] No writable temp directory found, fallback metrics will not be cached.");
        CacheRoot::PassThrough
    }

    pub fn directory(&self) -> Option<&Path> {
        match self {
            CacheRoot::Directory(dir) => Some(dir),
            CacheRoot::PassThrough => None,
        }
    }
}

fn default_probe_locations() -> Vec<PathBuf> {
    let mut locations = vec![std::env::temp_dir()];
    for fixed in ["/tmp", "/var/tmp"] {
        let fixed = PathBuf::from(fixed);
        if !locations.contains(&fixed) {
            locations.push(fixed);
        }
    }
    locations
}

fn is_writable(location: &Path) -> bool {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let marker = location.join(format!(
        ".fontfall-probe-{}-{}-{}",
        std::process::id(),
        nanos,
        PROBE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    match fs::create_dir(&marker) {
        Ok(()) => {
            let _ = fs::remove_dir(&marker);
            true
        }
        Err(_) => false,
    }
}

/// Names one cache entry.
///
/// The fingerprint covers the variants only. The fallback family picks the
/// reference font and the selection policy can pick a different
/// representative, so both are part of the entry name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub fingerprint: Fingerprint,
    pub fallback: FallbackFamily,
    pub policy: SelectionPolicy,
}

impl CacheKey {
    pub fn new(fingerprint: Fingerprint, fallback: FallbackFamily, policy: SelectionPolicy) -> Self {
        Self {
            fingerprint,
            fallback,
            policy,
        }
    }

    pub fn file_name(&self) -> String {
        let keywords = if self.policy.resolve_keywords { "-kw" } else { "" };
        format!(
            "{}-{}{}.{}",
            self.fingerprint,
            self.fallback.css_keyword(),
            keywords,
            ENTRY_EXTENSION
        )
    }
}

/// Result of a successful [`FingerprintCache::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Written,
    /// An entry existed already (possibly written concurrently); left untouched.
    AlreadyPresent,
    PassThrough,
}

/// Reads and writes cache entries in one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintCache {
    dir: Option<PathBuf>,
}

impl FingerprintCache {
    pub fn new(root: &CacheRoot) -> Self {
        Self {
            dir: root.directory().map(Path::to_path_buf),
        }
    }

    /// A cache storing entries directly in `dir`.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()) }
    }

    pub fn pass_through() -> Self {
        Self { dir: None }
    }

    /// The cache for one collection: its explicit directory if configured,
    /// otherwise the process-wide root.
    pub fn for_collection(root: &CacheRoot, explicit_dir: Option<&Path>) -> Self {
        match explicit_dir {
            Some(dir) => Self::at(dir),
            None => Self::new(root),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        self.dir.is_none()
    }

    pub fn entry_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(key.file_name()))
    }

    /// Looks up an entry. Unreadable or corrupt entries count as misses.
    pub fn get(&self, key: &CacheKey) -> Option<FallbackMetrics> {
        let path = self.entry_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("[CACHE] Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                warn!("[CACHE] Ignoring corrupt entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Stores an entry unless one already exists.
    ///
    /// The entry is written to a temporary file in the cache directory and
    /// moved into place without overwriting, so concurrent writers of the
    /// same key never leave a partial file behind.
    pub fn put(&self, key: &CacheKey, metrics: &FallbackMetrics) -> Result<PutOutcome, CacheError> {
        let (Some(dir), Some(path)) = (self.dir.as_ref(), self.entry_path(key)) else {
            return Ok(PutOutcome::PassThrough);
        };
        if path.exists() {
            return Ok(PutOutcome::AlreadyPresent);
        }

        fs::create_dir_all(dir)?;
        let bytes = serde_json::to_vec_pretty(metrics)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.flush()?;

        match file.persist_noclobber(&path) {
            Ok(_) => {
                debug!("[CACHE] Wrote {}", path.display());
                Ok(PutOutcome::Written)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(PutOutcome::AlreadyPresent),
            Err(e) => Err(CacheError::Io(e.error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontfall_types::FontVariant;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn metrics() -> FallbackMetrics {
        FallbackMetrics {
            size_adjust: "100.0000%".to_string(),
            ascent_override: "90.5273%".to_string(),
            descent_override: "21.1914%".to_string(),
            line_gap_override: "3.2715%".to_string(),
            fallback_font_name: "Arial".to_string(),
        }
    }

    fn key(path: &str) -> CacheKey {
        CacheKey::new(
            Fingerprint::of(&[FontVariant::new(path, "normal", None)]),
            FallbackFamily::SansSerif,
            SelectionPolicy::default(),
        )
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let cache = FingerprintCache::at(dir.path());
        let fp = key("a.ttf");

        assert_eq!(cache.get(&fp), None);
        assert_eq!(cache.put(&fp, &metrics()).unwrap(), PutOutcome::Written);
        assert_eq!(cache.get(&fp), Some(metrics()));
        assert!(dir.path().join(format!("{}-sans-serif.json", fp.fingerprint)).is_file());
    }

    #[test]
    fn test_fallback_and_policy_select_distinct_entries() {
        let dir = tempdir().unwrap();
        let cache = FingerprintCache::at(dir.path());
        let sans = key("a.ttf");
        let mono = CacheKey::new(sans.fingerprint.clone(), FallbackFamily::Monospace, sans.policy);
        let keywords = CacheKey::new(
            sans.fingerprint.clone(),
            FallbackFamily::SansSerif,
            SelectionPolicy::default().with_keywords(true),
        );

        cache.put(&sans, &metrics()).unwrap();
        assert_eq!(cache.get(&mono), None);
        assert_eq!(cache.get(&keywords), None);

        let mut courier = metrics();
        courier.fallback_font_name = "Courier New".to_string();
        assert_eq!(cache.put(&mono, &courier).unwrap(), PutOutcome::Written);
        assert_eq!(cache.get(&mono), Some(courier));
        assert_eq!(cache.get(&sans), Some(metrics()));
        assert_eq!(
            keywords.file_name(),
            format!("{}-sans-serif-kw.json", sans.fingerprint)
        );
    }

    #[test]
    fn test_put_is_write_if_absent() {
        let dir = tempdir().unwrap();
        let cache = FingerprintCache::at(dir.path());
        let fp = key("a.ttf");

        cache.put(&fp, &metrics()).unwrap();
        let mut other = metrics();
        other.size_adjust = "50.0000%".to_string();
        assert_eq!(cache.put(&fp, &other).unwrap(), PutOutcome::AlreadyPresent);
        assert_eq!(cache.get(&fp), Some(metrics()));
    }

    #[test]
    fn test_put_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let cache = FingerprintCache::at(dir.path().join("nested").join("cache"));
        let fp = key("a.ttf");

        assert_eq!(cache.put(&fp, &metrics()).unwrap(), PutOutcome::Written);
        assert_eq!(cache.get(&fp), Some(metrics()));
    }

    #[test]
    fn test_concurrent_puts_do_not_corrupt() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(FingerprintCache::at(dir.path()));
        let fp = key("shared.ttf");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let cache = Arc::clone(&cache);
                let fp = fp.clone();
                scope.spawn(move || cache.put(&fp, &metrics()).unwrap());
            }
        });

        assert_eq!(cache.get(&fp), Some(metrics()));
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary files must not be left behind");
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = FingerprintCache::at(dir.path());
        let fp = key("a.ttf");
        fs::write(cache.entry_path(&fp).unwrap(), b"{ not json").unwrap();

        assert_eq!(cache.get(&fp), None);
    }

    #[test]
    fn test_pass_through_mode() {
        let cache = FingerprintCache::pass_through();
        let fp = key("a.ttf");

        assert!(cache.is_pass_through());
        assert_eq!(cache.put(&fp, &metrics()).unwrap(), PutOutcome::PassThrough);
        assert_eq!(cache.get(&fp), None);
    }

    #[test]
    fn test_put_into_unwritable_location_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"a file, not a directory").unwrap();

        let cache = FingerprintCache::at(blocker.join("cache"));
        assert!(cache.put(&key("a.ttf"), &metrics()).is_err());
        assert_eq!(cache.get(&key("a.ttf")), None);
    }

    #[test]
    fn test_probe_picks_first_writable_location() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let root = CacheRoot::probe_locations(&[missing, dir.path().to_path_buf()]);

        assert_eq!(root, CacheRoot::Directory(dir.path().join(CACHE_DIR_NAME)));
        // Marker directories are cleaned up and the root is created lazily.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_probe_without_writable_location() {
        let dir = tempdir().unwrap();
        let root = CacheRoot::probe_locations(&[dir.path().join("missing")]);
        assert_eq!(root, CacheRoot::PassThrough);
        assert_eq!(FingerprintCache::new(&root), FingerprintCache::pass_through());
    }

    #[test]
    fn test_explicit_directory_overrides_root() {
        let dir = tempdir().unwrap();
        let root = CacheRoot::Directory(dir.path().join("root"));
        let explicit = dir.path().join("explicit");

        let cache = FingerprintCache::for_collection(&root, Some(&explicit));
        assert_eq!(cache, FingerprintCache::at(&explicit));

        let cache = FingerprintCache::for_collection(&CacheRoot::PassThrough, Some(&explicit));
        assert!(!cache.is_pass_through());

        let cache = FingerprintCache::for_collection(&root, None);
        assert_eq!(cache, FingerprintCache::at(dir.path().join("root")));
    }
}
