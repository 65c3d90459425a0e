// src/pipeline/orchestrator.rs
use super::context::PipelineContext;
use crate::error::PipelineError;
use fontfall_core::{CacheKey, Candidate, Fingerprint, PutOutcome, select_representative, synthesize};
use fontfall_resource::SourceResolver;
use fontfall_traits::{FontMetadataParser, FontParseError, ResourceError};
use fontfall_types::{FallbackMetrics, FontCollection, ParsedFontMetadata};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::runtime::Builder;
use tokio::task::{self, JoinSet};

/// Why a single variant did not produce metadata. Always recovered from.
#[derive(Error, Debug)]
enum VariantError {
    #[error("font is not available")]
    Absent,
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Parse(#[from] FontParseError),
    #[error("parser task failed: {0}")]
    Task(String),
}

/// The result for one collection of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOutcome {
    pub name: String,
    pub fingerprint: Fingerprint,
    /// `None` when no variant could be used.
    pub metrics: Option<FallbackMetrics>,
}

/// The fallback metric pipeline.
///
/// For each collection: fingerprint, cache lookup, concurrent resolve and
/// parse of every variant, selection of one representative, synthesis and a
/// best-effort cache write.
#[derive(Debug, Clone)]
pub struct FallbackPipeline {
    context: Arc<PipelineContext>,
}

impl FallbackPipeline {
    pub fn new(context: PipelineContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Computes fallback metrics for one collection.
    ///
    /// Returns `None` for an empty collection, or when every variant failed to
    /// load or parse. Individual failures are logged and skipped.
    pub async fn run(&self, collection: &FontCollection) -> Option<FallbackMetrics> {
        process_collection(&self.context, collection).await
    }

    /// Processes independent collections concurrently. Outcomes are returned
    /// in input order.
    pub async fn run_all(&self, collections: &[FontCollection]) -> Vec<CollectionOutcome> {
        let start = Instant::now();
        info!("[PIPELINE] Processing {} collection(s).", collections.len());

        let mut tasks = JoinSet::new();
        for (index, collection) in collections.iter().cloned().enumerate() {
            let context = Arc::clone(&self.context);
            tasks.spawn(async move { (index, process_collection(&context, &collection).await) });
        }

        let mut finished = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, metrics)) => {
                    finished.insert(index, metrics);
                }
                Err(e) => warn!("[PIPELINE] A collection task failed: {}", e),
            }
        }

        info!("[PIPELINE] Finished in {:.2?}.", start.elapsed());
        collections
            .iter()
            .enumerate()
            .map(|(index, collection)| CollectionOutcome {
                name: collection.name.clone(),
                fingerprint: Fingerprint::of(&collection.variants),
                metrics: finished.remove(&index).flatten(),
            })
            .collect()
    }

    /// Blocking variant of [`run_all`](Self::run_all) that drives its own
    /// multi-threaded runtime.
    pub fn run_all_blocking(&self, collections: &[FontCollection]) -> Result<Vec<CollectionOutcome>, PipelineError> {
        let runtime = Builder::new_multi_thread().enable_all().build()?;
        Ok(runtime.block_on(self.run_all(collections)))
    }
}

async fn process_collection(context: &PipelineContext, collection: &FontCollection) -> Option<FallbackMetrics> {
    if collection.variants.is_empty() {
        info!("[PIPELINE] Collection '{}' has no variants, skipping.", collection.name);
        return None;
    }

    let fingerprint = Fingerprint::of(&collection.variants);
    let key = CacheKey::new(fingerprint.clone(), collection.fallback, context.selection_policy);
    let cache = context.cache_for(collection);

    let lookup = {
        let cache = cache.clone();
        let key = key.clone();
        task::spawn_blocking(move || cache.get(&key)).await
    };
    match lookup {
        Ok(Some(metrics)) => {
            debug!("[CACHE] Hit for '{}' ({}).", collection.name, fingerprint.short());
            return Some(metrics);
        }
        Ok(None) => debug!("[CACHE] Miss for '{}' ({}).", collection.name, fingerprint.short()),
        Err(e) => warn!("[CACHE] Lookup task failed: {}", e),
    }

    let candidates = load_candidates(context, collection).await;
    if candidates.is_empty() {
        warn!(
            "[PIPELINE] No usable variant in '{}', no fallback metrics generated.",
            collection.name
        );
        return None;
    }

    let representative = select_representative(&candidates, context.selection_policy)?;
    debug!(
        "[PIPELINE] '{}' represented by '{}' ({} / {}).",
        collection.name,
        representative.variant.path,
        representative.variant.style,
        representative
            .variant
            .weight
            .as_ref()
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string())
    );

    let metrics = match synthesize(&representative.metadata, collection.fallback) {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!("[PIPELINE] Cannot synthesize metrics for '{}': {}", collection.name, e);
            return None;
        }
    };

    let stored = {
        let metrics = metrics.clone();
        task::spawn_blocking(move || cache.put(&key, &metrics)).await
    };
    match stored {
        Ok(Ok(PutOutcome::Written)) => debug!("[CACHE] Stored metrics for '{}'.", collection.name),
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("[CACHE] Could not store metrics for '{}': {}", collection.name, e),
        Err(e) => warn!("[CACHE] Store task failed: {}", e),
    }

    Some(metrics)
}

/// Resolves and parses every variant concurrently, keeping input order.
async fn load_candidates(context: &PipelineContext, collection: &FontCollection) -> Vec<Candidate> {
    let mut tasks = JoinSet::new();
    for (index, variant) in collection.variants.iter().enumerate() {
        let resolver = Arc::clone(&context.resolver);
        let parser = Arc::clone(&context.parser);
        let path = variant.path.clone();
        tasks.spawn(async move { (index, load_variant(resolver, parser, path).await) });
    }

    // Completion order is arbitrary; re-sequence by input index.
    let mut parsed = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(metadata))) => {
                parsed.insert(index, metadata);
            }
            Ok((index, Err(e))) => warn!(
                "[RESOLVE] Skipping '{}' in '{}': {}",
                collection.variants[index].path, collection.name, e
            ),
            Err(e) => warn!("[RESOLVE] Variant task in '{}' failed: {}", collection.name, e),
        }
    }

    parsed
        .into_iter()
        .map(|(index, metadata)| Candidate::new(collection.variants[index].clone(), metadata))
        .collect()
}

async fn load_variant(
    resolver: Arc<SourceResolver>,
    parser: Arc<dyn FontMetadataParser>,
    path: String,
) -> Result<ParsedFontMetadata, VariantError> {
    let data = resolver.resolve(&path).await?.ok_or(VariantError::Absent)?;
    let parsed = task::spawn_blocking(move || parser.parse(&data))
        .await
        .map_err(|e| VariantError::Task(e.to_string()))??;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineBuilder;
    use fontfall_core::testing::TestFont;
    use fontfall_traits::InMemoryResourceProvider;
    use fontfall_types::{FallbackFamily, FontVariant};

    fn pipeline(provider: InMemoryResourceProvider) -> FallbackPipeline {
        PipelineBuilder::new()
            .with_resource_provider(Arc::new(provider))
            .without_cache()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_collection_is_absent() {
        let pipeline = pipeline(InMemoryResourceProvider::new());
        let collection = FontCollection::new("Empty", FallbackFamily::Serif);
        assert!(pipeline.run(&collection).await.is_none());
    }

    #[tokio::test]
    async fn test_selects_regular_variant() {
        let provider = InMemoryResourceProvider::new()
            .with("regular.ttf", TestFont::default().build())
            .with(
                "bold.ttf",
                TestFont::default().with_units_per_em(1000).build(),
            );
        let collection = FontCollection::new("Test", FallbackFamily::SansSerif)
            .with_variant(FontVariant::new("bold.ttf", "normal", Some(700.into())))
            .with_variant(FontVariant::new("regular.ttf", "normal", Some(400.into())));

        let metrics = pipeline(provider).run(&collection).await.unwrap();
        assert_eq!(metrics.size_adjust, "100.0000%");
        assert_eq!(metrics.fallback_font_name, "Arial");
    }

    #[tokio::test]
    async fn test_unparsable_variant_is_skipped() {
        let provider = InMemoryResourceProvider::new()
            .with("broken.ttf", b"not a font".to_vec())
            .with("good.ttf", TestFont::default().build());
        let collection = FontCollection::new("Test", FallbackFamily::Monospace)
            .with_variant(FontVariant::new("broken.ttf", "normal", Some(400.into())))
            .with_variant(FontVariant::new("good.ttf", "normal", Some(700.into())));

        let metrics = pipeline(provider).run(&collection).await.unwrap();
        assert_eq!(metrics.fallback_font_name, "Courier New");
    }

    #[tokio::test]
    async fn test_all_variants_missing_is_absent() {
        let collection = FontCollection::new("Test", FallbackFamily::Serif)
            .with_variant(FontVariant::new("missing.ttf", "normal", Some(400.into())));
        assert!(pipeline(InMemoryResourceProvider::new()).run(&collection).await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_all_keeps_input_order() {
        let provider = InMemoryResourceProvider::new().with("a.ttf", TestFont::default().build());
        let collections = vec![
            FontCollection::new("First", FallbackFamily::Serif)
                .with_variant(FontVariant::new("a.ttf", "normal", None)),
            FontCollection::new("Second", FallbackFamily::Serif),
            FontCollection::new("Third", FallbackFamily::Monospace)
                .with_variant(FontVariant::new("a.ttf", "italic", None)),
        ];

        let outcomes = pipeline(provider).run_all(&collections).await;
        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
        assert_eq!(outcomes[0].metrics.as_ref().unwrap().fallback_font_name, "Times New Roman");
        assert!(outcomes[1].metrics.is_none());
        assert_eq!(outcomes[2].metrics.as_ref().unwrap().fallback_font_name, "Courier New");
        assert_eq!(outcomes[2].fingerprint, Fingerprint::of(&collections[2].variants));
    }

    #[test]
    fn test_run_all_blocking() {
        let provider = InMemoryResourceProvider::new().with("a.ttf", TestFont::default().build());
        let collections = vec![
            FontCollection::new("Only", FallbackFamily::SansSerif)
                .with_variant(FontVariant::new("a.ttf", "normal", Some(400.into()))),
        ];
        let outcomes = pipeline(provider).run_all_blocking(&collections).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].metrics.is_some());
    }
}
