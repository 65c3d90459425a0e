//! Fallback metric synthesis.
//!
//! `size-adjust` scales the fallback font's em square to the real font's;
//! the three overrides are then expressed relative to that adjusted em square
//! so the fallback line box matches the real one once the web font swaps in.

use crate::error::MetricsError;
use fontfall_types::{FallbackFamily, FallbackMetrics, ParsedFontMetadata};

/// Metrics of a locally installed generic fallback font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceFont {
    /// Name used in `src: local(...)`.
    pub name: &'static str,
    pub units_per_em: u16,
}

pub const SERIF_REFERENCE: ReferenceFont = ReferenceFont {
    name: "Times New Roman",
    units_per_em: 2048,
};

pub const SANS_SERIF_REFERENCE: ReferenceFont = ReferenceFont {
    name: "Arial",
    units_per_em: 2048,
};

pub const MONOSPACE_REFERENCE: ReferenceFont = ReferenceFont {
    name: "Courier New",
    units_per_em: 2048,
};

pub fn reference_font(family: FallbackFamily) -> &'static ReferenceFont {
    match family {
        FallbackFamily::Serif => &SERIF_REFERENCE,
        FallbackFamily::SansSerif => &SANS_SERIF_REFERENCE,
        FallbackFamily::Monospace => &MONOSPACE_REFERENCE,
    }
}

/// Formats a ratio as a CSS percentage with four decimals.
///
/// The sign is dropped: fonts store descent as a negative number while the
/// descriptor takes a positive one.
pub fn format_percentage(value: f64) -> String {
    format!("{:.4}%", (value * 100.0).abs())
}

fn require_finite(name: &str, value: f64) -> Result<f64, MetricsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricsError::MalformedMetadata(format!("{} is not finite", name)))
    }
}

/// Computes the override descriptors for `metadata` against `family`.
///
/// # Errors
///
/// `MetricsError::MalformedMetadata` for a zero `unitsPerEm` or non-finite
/// metrics. Well-formed input never fails.
pub fn synthesize(
    metadata: &ParsedFontMetadata,
    family: FallbackFamily,
) -> Result<FallbackMetrics, MetricsError> {
    if metadata.units_per_em == 0 {
        return Err(MetricsError::MalformedMetadata("unitsPerEm is zero".to_string()));
    }
    let ascent = require_finite("ascent", metadata.ascent)?;
    let descent = require_finite("descent", metadata.descent)?;
    let line_gap = require_finite("lineGap", metadata.line_gap)?;

    let reference = reference_font(family);
    let units_per_em = f64::from(metadata.units_per_em);
    let size_adjust = units_per_em / f64::from(reference.units_per_em);

    let normalize = |name: &str, value: f64| require_finite(name, (value / units_per_em) / size_adjust);

    Ok(FallbackMetrics {
        size_adjust: format_percentage(size_adjust),
        ascent_override: format_percentage(normalize("ascentOverride", ascent)?),
        descent_override: format_percentage(normalize("descentOverride", descent)?),
        line_gap_override: format_percentage(normalize("lineGapOverride", line_gap)?),
        fallback_font_name: reference.name.to_string(),
    })
}
