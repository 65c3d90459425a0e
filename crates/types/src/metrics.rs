use serde::{Deserialize, Serialize};

/// Metrics extracted from a font binary.
///
/// Values are in font design units. `descent` keeps the sign used by the
/// font (usually negative).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFontMetadata {
    pub units_per_em: u16,
    pub ascent: f64,
    pub descent: f64,
    pub line_gap: f64,
    pub cap_height: Option<f64>,
    pub family_name: String,
}

/// CSS override descriptors that reshape a local fallback font.
///
/// The four numeric fields are percentage strings (`"97.1250%"`), ready to be
/// emitted verbatim. Serialized as a flat JSON object for the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackMetrics {
    pub size_adjust: String,
    pub ascent_override: String,
    pub descent_override: String,
    pub line_gap_override: String,
    /// Name of the locally installed font the overrides apply to.
    pub fallback_font_name: String,
}
