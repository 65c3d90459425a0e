use crate::format::{FontFormat, FormatError};
use crate::weight::FontWeight;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One concrete font file or URL within a collection.
///
/// Identity for caching is the `(path, style, weight)` triple. The
/// remaining fields only affect the emitted CSS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontVariant {
    /// Local filesystem path or absolute `http(s)://` URL.
    pub path: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    /// Emit a `<link rel="preload">` for this file.
    #[serde(default = "default_preload")]
    pub preload: bool,
    /// Embed the font bytes as a base64 `data:` URL instead of linking it.
    #[serde(default)]
    pub inline: bool,
    /// Extra descriptors copied into the variant's `@font-face` rule.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub css: BTreeMap<String, String>,
}

fn default_style() -> String {
    "normal".to_string()
}

fn default_preload() -> bool {
    true
}

impl FontVariant {
    pub fn new(path: impl Into<String>, style: impl Into<String>, weight: Option<FontWeight>) -> Self {
        Self {
            path: path.into(),
            style: style.into(),
            weight,
            preload: default_preload(),
            inline: false,
            css: BTreeMap::new(),
        }
    }

    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    pub fn with_css(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.css.insert(property.into(), value.into());
        self
    }

    /// Inlined fonts are embedded in the stylesheet, so they are never
    /// preloaded separately.
    pub fn wants_preload(&self) -> bool {
        self.preload && !self.inline
    }

    /// Returns true if the path should be fetched over the network.
    pub fn is_remote(&self) -> bool {
        is_url(&self.path)
    }

    /// Infers the container format from the path's extension.
    pub fn format(&self) -> Result<FontFormat, FormatError> {
        FontFormat::from_path(&self.path)
    }

    /// The final path segment, without query string or fragment.
    pub fn file_name(&self) -> &str {
        let trimmed = self
            .path
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.path);
        trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
    }
}

/// Returns true for `http://` and `https://` paths.
pub fn is_url(path: &str) -> bool {
    let lower = path.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// A generic, OS-installed font category used before the real font loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackFamily {
    #[default]
    Serif,
    SansSerif,
    Monospace,
}

impl FallbackFamily {
    /// The CSS generic family keyword.
    pub fn css_keyword(&self) -> &'static str {
        match self {
            FallbackFamily::Serif => "serif",
            FallbackFamily::SansSerif => "sans-serif",
            FallbackFamily::Monospace => "monospace",
        }
    }
}

impl fmt::Display for FallbackFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_keyword())
    }
}

/// A logical font family made of one or more variants.
///
/// A collection is the unit of fallback metric computation: it yields one
/// result regardless of how many variants it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontCollection {
    pub name: String,
    #[serde(rename = "src", default)]
    pub variants: Vec<FontVariant>,
    #[serde(default)]
    pub fallback: FallbackFamily,
    /// Explicit cache directory for this collection; overrides the probed root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_selector")]
    pub selector: String,
    #[serde(default = "default_display")]
    pub display: String,
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,
}

fn default_selector() -> String {
    "html".to_string()
}

fn default_display() -> String {
    "swap".to_string()
}

fn default_base_path() -> PathBuf {
    PathBuf::from("./public")
}

impl FontCollection {
    pub fn new(name: impl Into<String>, fallback: FallbackFamily) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            fallback,
            cache_dir: None,
            selector: default_selector(),
            display: default_display(),
            base_path: default_base_path(),
        }
    }

    pub fn with_variant(mut self, variant: FontVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Checks that every variant has a recognizable font extension.
    pub fn validate(&self) -> Result<(), FormatError> {
        for variant in &self.variants {
            variant.format()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_detection() {
        assert!(is_url("https://fonts.example.com/a.woff2"));
        assert!(is_url("HTTP://example.com/a.ttf"));
        assert!(!is_url("./public/a.ttf"));
        assert!(!is_url("/srv/https/a.ttf"));
    }

    #[test]
    fn test_file_name_strips_query() {
        let v = FontVariant::new("https://cdn.example.com/f/inter.woff2?v=3", "normal", None);
        assert_eq!(v.file_name(), "inter.woff2");

        let local = FontVariant::new("./public/fonts/inter.ttf", "normal", None);
        assert_eq!(local.file_name(), "inter.ttf");
    }

    #[test]
    fn test_collection_deserialize_defaults() {
        let json = r#"{ "name": "Inter", "src": [ { "path": "a.ttf" } ] }"#;
        let c: FontCollection = serde_json::from_str(json).unwrap();
        assert_eq!(c.fallback, FallbackFamily::Serif);
        assert_eq!(c.display, "swap");
        assert_eq!(c.variants[0].style, "normal");
        assert!(c.variants[0].weight.is_none());
        assert!(c.variants[0].preload);
        assert!(!c.variants[0].inline);
        assert!(c.variants[0].css.is_empty());
    }

    #[test]
    fn test_variant_css_options() {
        let json = r#"{
            "path": "a.woff2",
            "inline": true,
            "preload": true,
            "css": { "unicode-range": "U+0000-00FF" }
        }"#;
        let v: FontVariant = serde_json::from_str(json).unwrap();
        assert!(v.inline);
        assert!(!v.wants_preload());
        assert_eq!(v.css["unicode-range"], "U+0000-00FF");

        let v = FontVariant::new("b.ttf", "normal", None).with_preload(false);
        assert!(!v.wants_preload());
        assert!(!v.is_remote());
    }

    #[test]
    fn test_fallback_family_serde_names() {
        let f: FallbackFamily = serde_json::from_str("\"sans-serif\"").unwrap();
        assert_eq!(f, FallbackFamily::SansSerif);
        assert_eq!(f.to_string(), "sans-serif");
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let c = FontCollection::new("Broken", FallbackFamily::Serif)
            .with_variant(FontVariant::new("fonts/readme.txt", "normal", None));
        assert!(c.validate().is_err());
    }
}
