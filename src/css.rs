//! CSS emission for a processed collection.

use crate::error::PipelineError;
use base64::prelude::*;
use fontfall_core::Fingerprint;
use fontfall_resource::SourceResolver;
use fontfall_traits::ResourceError;
use fontfall_types::{FallbackMetrics, FontCollection, FontVariant, is_url};
use log::debug;
use std::path::{Component, Path, PathBuf};

const FALLBACK_PREFIX: &str = "_font_fallback_";

/// Family name of the synthesized fallback face. Derived from the
/// fingerprint, so rebuilding unchanged input yields identical CSS.
pub fn fallback_family_name(fingerprint: &Fingerprint) -> String {
    format!("{}{}", FALLBACK_PREFIX, fingerprint.short())
}

/// Renders the selector rule and, when metrics exist, the `@font-face` of
/// the adjusted local fallback.
///
/// Without metrics only the selector rule is produced, naming the real
/// family and the generic keyword.
pub fn fallback_css(
    collection: &FontCollection,
    fingerprint: &Fingerprint,
    metrics: Option<&FallbackMetrics>,
) -> String {
    let Some(metrics) = metrics else {
        return format!(
            "{}{{font-family: {}, {};}}",
            collection.selector, collection.name, collection.fallback
        );
    };

    let fallback_name = fallback_family_name(fingerprint);
    format!(
        "{selector}{{font-family: {name}, {fallback_name}, {generic};}}\
         @font-face{{font-family: {fallback_name}; size-adjust: {size}; src: local('{local}'); \
         ascent-override: {ascent}; descent-override: {descent}; line-gap-override: {gap};}}",
        selector = collection.selector,
        name = collection.name,
        generic = collection.fallback,
        size = metrics.size_adjust,
        local = metrics.fallback_font_name,
        ascent = metrics.ascent_override,
        descent = metrics.descent_override,
        gap = metrics.line_gap_override,
    )
}

/// One `@font-face` rule per variant.
///
/// Variants marked `inline` are loaded through `resolver` and embedded as a
/// base64 `data:` URL; an inline font that cannot be loaded is an error.
/// All other variants point at their served URL.
pub async fn font_face_rules(
    collection: &FontCollection,
    resolver: &SourceResolver,
) -> Result<Vec<String>, PipelineError> {
    let mut rules = Vec::with_capacity(collection.variants.len());
    for variant in &collection.variants {
        let src = if variant.inline {
            let data = resolver
                .resolve(&variant.path)
                .await?
                .ok_or_else(|| ResourceError::NotFound(variant.path.clone()))?;
            debug!("Inlining {} ({} bytes)", variant.path, data.len());
            inline_src(variant, &data)?
        } else {
            linked_src(collection, variant)?
        };
        rules.push(font_face_rule(collection, variant, &src));
    }
    Ok(rules)
}

fn linked_src(collection: &FontCollection, variant: &FontVariant) -> Result<String, PipelineError> {
    let format = variant.format()?;
    Ok(format!(
        "url({}) format('{}')",
        public_url(&collection.base_path, &variant.path),
        format.css_format()
    ))
}

fn inline_src(variant: &FontVariant, data: &[u8]) -> Result<String, PipelineError> {
    let format = variant.format()?;
    Ok(format!(
        "url(data:{};base64,{}) format('{}')",
        format.mime_type(),
        BASE64_STANDARD.encode(data),
        format.css_format()
    ))
}

fn font_face_rule(collection: &FontCollection, variant: &FontVariant, src: &str) -> String {
    let descriptors: String = variant
        .css
        .iter()
        .map(|(property, value)| format!("{}: {}; ", property, value))
        .collect();
    let weight = variant
        .weight
        .as_ref()
        .map(|w| format!(" font-weight: {};", w))
        .unwrap_or_default();
    format!(
        "@font-face {{{}font-style: {};{} font-family: {}; font-display: {}; src: {};}}",
        descriptors, variant.style, weight, collection.name, collection.display, src
    )
}

/// `<link rel="preload">` tags for every variant that asks for one.
/// Inlined variants are skipped.
pub fn preload_links(collection: &FontCollection) -> Result<Vec<String>, PipelineError> {
    collection
        .variants
        .iter()
        .filter(|variant| variant.wants_preload())
        .map(|variant| {
            let format = variant.format()?;
            Ok(format!(
                "<link rel=\"preload\" href=\"{}\" as=\"font\" type=\"{}\" crossorigin>",
                public_url(&collection.base_path, &variant.path),
                format.mime_type()
            ))
        })
        .collect()
}

/// The URL a variant is served from: remote URLs unchanged, local paths
/// made root-relative to the public base directory.
pub fn public_url(base_path: &Path, path: &str) -> String {
    if is_url(path) {
        return path.to_string();
    }
    let base = normalized(base_path);
    let full = normalized(Path::new(path));
    let relative = full.strip_prefix(&base).unwrap_or(&full);
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", segments.join("/"))
}

fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
