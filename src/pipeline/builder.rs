// src/pipeline/builder.rs
use super::context::PipelineContext;
use super::orchestrator::FallbackPipeline;
use crate::error::PipelineError;
use fontfall_core::{CacheRoot, SelectionPolicy, TtfMetadataParser};
use fontfall_resource::SourceResolver;
use fontfall_traits::{FontMetadataParser, ResourceProvider};
use std::path::PathBuf;
use std::sync::Arc;

/// Where the builder should put cache entries.
#[derive(Debug, Clone, Default)]
enum CacheSetting {
    /// Probe the OS temp locations at build time.
    #[default]
    Probe,
    Directory(PathBuf),
    Disabled,
}

/// A builder for creating a `FallbackPipeline`.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    cache: CacheSetting,
    storage: Option<bool>,
    selection_policy: SelectionPolicy,
    parser: Option<Arc<dyn FontMetadataParser>>,
    resolver: Option<SourceResolver>,
}

impl PipelineBuilder {
    /// Creates a new `PipelineBuilder` with default settings: probed cache
    /// root, detected storage, ttf-parser backend.
    pub fn new() -> Self { Default::default() }

    /// Stores cache entries in `dir` instead of a probed temp location.
    /// A collection's own `cacheDir` still takes precedence.
    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self { self.cache = CacheSetting::Directory(dir.into()); self }

    /// Disables the process-wide cache root. Collections with an explicit
    /// `cacheDir` are still cached there.
    pub fn without_cache(mut self) -> Self { self.cache = CacheSetting::Disabled; self }

    /// Forces local storage on or off. When off, local paths resolve to
    /// nothing, as on a platform without a filesystem.
    pub fn with_storage(mut self, storage: bool) -> Self { self.storage = Some(storage); self }

    /// Controls how configured weights are interpreted during selection.
    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self { self.selection_policy = policy; self }

    /// Replaces the font metadata parser.
    pub fn with_parser(mut self, parser: Arc<dyn FontMetadataParser>) -> Self { self.parser = Some(parser); self }

    /// Serves every path, local or remote, from `provider`.
    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.resolver = Some(SourceResolver::new(Some(Arc::clone(&provider)), provider));
        self
    }

    /// Uses a fully configured resolver instead of detecting one.
    pub fn with_resolver(mut self, resolver: SourceResolver) -> Self { self.resolver = Some(resolver); self }

    /// Consumes the builder, runs the capability probes and creates the
    /// `FallbackPipeline`.
    pub fn build(self) -> Result<FallbackPipeline, PipelineError> {
        let mut resolver = match self.resolver {
            Some(resolver) => resolver,
            None => SourceResolver::detect()?,
        };
        match self.storage {
            Some(false) => {
                log::info!("Local storage disabled, local font paths will resolve to nothing.");
                resolver = resolver.without_storage();
            }
            Some(true) if !resolver.has_storage() => {
                return Err(PipelineError::Config(
                    "Local storage was requested but is not available on this platform.".to_string(),
                ));
            }
            _ => {}
        }

        let cache_root = match self.cache {
            CacheSetting::Probe => CacheRoot::probe(),
            CacheSetting::Directory(dir) => CacheRoot::Directory(dir),
            CacheSetting::Disabled => {
                log::info!("Fallback metric cache disabled.");
                CacheRoot::PassThrough
            }
        };

        let parser = self
            .parser
            .unwrap_or_else(|| Arc::new(TtfMetadataParser::new()));
        log::debug!("Using font metadata parser '{}'.", parser.name());

        let context = PipelineContext {
            resolver: Arc::new(resolver),
            parser,
            cache_root,
            selection_policy: self.selection_policy,
        };

        Ok(FallbackPipeline::new(context))
    }
}
