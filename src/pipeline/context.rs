use fontfall_core::{CacheRoot, FingerprintCache, SelectionPolicy};
use fontfall_resource::SourceResolver;
use fontfall_traits::FontMetadataParser;
use fontfall_types::FontCollection;
use std::sync::Arc;

/// A container for all shared, read-only resources needed during a pipeline run.
/// This is created once by the `PipelineBuilder` and cloned into every task.
///
/// Capability probes (local storage, writable cache root) have already run by
/// the time a context exists; their outcomes live here instead of in globals.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub resolver: Arc<SourceResolver>,
    pub parser: Arc<dyn FontMetadataParser>,
    pub cache_root: CacheRoot,
    pub selection_policy: SelectionPolicy,
}

impl PipelineContext {
    /// The cache serving `collection`, honouring its explicit directory.
    pub fn cache_for(&self, collection: &FontCollection) -> FingerprintCache {
        FingerprintCache::for_collection(&self.cache_root, collection.cache_dir.as_deref())
    }
}
