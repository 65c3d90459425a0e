//! Copies a collection's fonts under its public base directory.

use fontfall_resource::SourceResolver;
use fontfall_types::{FontCollection, FontVariant};
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinSet;

/// Directory, relative to a collection's base path, holding copied fonts.
pub const GENERATED_DIR: &str = "__fontfall_generated__";

/// Downloads or copies every variant to `<basePath>/__fontfall_generated__/`
/// and returns the collection with its paths pointing at the copies.
///
/// Files already present are reused without fetching. A variant that cannot
/// be fetched or written, or whose path has no file name, keeps its original
/// path.
pub async fn localize_collection(resolver: Arc<SourceResolver>, collection: &FontCollection) -> FontCollection {
    let target_dir = collection.base_path.join(GENERATED_DIR);
    let mut tasks = JoinSet::new();
    for (index, variant) in collection.variants.iter().enumerate() {
        let resolver = Arc::clone(&resolver);
        let variant = variant.clone();
        let target_dir = target_dir.clone();
        tasks.spawn(async move { (index, localize_variant(&resolver, &variant, &target_dir).await) });
    }

    let mut localized = collection.clone();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(path))) => localized.variants[index].path = path.to_string_lossy().into_owned(),
            Ok((index, Err(e))) => warn!(
                "[LOCALIZE] Keeping '{}' as is: {}",
                collection.variants[index].path, e
            ),
            Err(e) => warn!("[LOCALIZE] Copy task in '{}' failed: {}", collection.name, e),
        }
    }
    info!("[LOCALIZE] '{}' localized under {}", collection.name, target_dir.display());
    localized
}

async fn localize_variant(resolver: &SourceResolver, variant: &FontVariant, target_dir: &Path) -> io::Result<PathBuf> {
    let file_name = variant.file_name();
    if file_name.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"));
    }
    let target = target_dir.join(file_name);

    if fs::try_exists(&target).await? {
        debug!("[LOCALIZE] {} already exists.", target.display());
        return Ok(target);
    }

    let data = resolver
        .resolve(&variant.path)
        .await
        .map_err(io::Error::other)?
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "font is not available"))?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&target, data.as_slice()).await?;
    let action = if variant.is_remote() { "Downloaded" } else { "Copied" };
    info!("[LOCALIZE] {} {} to {}", action, variant.path, target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontfall_traits::{InMemoryResourceProvider, ResourceProvider};
    use fontfall_types::FallbackFamily;
    use tempfile::tempdir;

    fn resolver(provider: InMemoryResourceProvider) -> Arc<SourceResolver> {
        let provider: Arc<dyn ResourceProvider> = Arc::new(provider);
        Arc::new(SourceResolver::new(Some(Arc::clone(&provider)), provider))
    }

    fn collection(base: &Path) -> FontCollection {
        let mut c = FontCollection::new("Inter", FallbackFamily::SansSerif)
            .with_variant(FontVariant::new("https://cdn.example.com/inter.woff2?v=2", "normal", Some(400.into())))
            .with_variant(FontVariant::new("missing.ttf", "italic", None));
        c.base_path = base.to_path_buf();
        c
    }

    #[tokio::test]
    async fn test_localize_copies_and_rewrites() {
        let dir = tempdir().unwrap();
        let provider = InMemoryResourceProvider::new()
            .with("https://cdn.example.com/inter.woff2?v=2", b"woff2 bytes".to_vec());

        let localized = localize_collection(resolver(provider), &collection(dir.path())).await;

        let expected = dir.path().join(GENERATED_DIR).join("inter.woff2");
        assert_eq!(localized.variants[0].path, expected.to_string_lossy());
        assert_eq!(std::fs::read(&expected).unwrap(), b"woff2 bytes");
        // Unavailable fonts keep their original path.
        assert_eq!(localized.variants[1].path, "missing.ttf");
    }

    #[tokio::test]
    async fn test_existing_copy_is_reused() {
        let dir = tempdir().unwrap();
        let generated = dir.path().join(GENERATED_DIR);
        std::fs::create_dir_all(&generated).unwrap();
        std::fs::write(generated.join("inter.woff2"), b"already here").unwrap();

        // Nothing to fetch from: the existing file must be used as is.
        let localized = localize_collection(resolver(InMemoryResourceProvider::new()), &collection(dir.path())).await;

        assert_eq!(localized.variants[0].path, generated.join("inter.woff2").to_string_lossy());
        assert_eq!(std::fs::read(generated.join("inter.woff2")).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn test_path_without_file_name_is_kept() {
        let dir = tempdir().unwrap();
        let mut c = FontCollection::new("Dir", FallbackFamily::Serif)
            .with_variant(FontVariant::new("https://cdn.example.com/fonts/", "normal", None));
        c.base_path = dir.path().to_path_buf();
        let provider = InMemoryResourceProvider::new().with("https://cdn.example.com/fonts/", b"listing".to_vec());

        let localized = localize_collection(resolver(provider), &c).await;

        assert_eq!(localized.variants[0].path, "https://cdn.example.com/fonts/");
        assert!(!dir.path().join(GENERATED_DIR).exists());
    }
}
