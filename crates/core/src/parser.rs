//! Font metadata extraction using ttf-parser.

use crate::container::unwrap_container;
use fontfall_traits::{FontMetadataParser, FontParseError};
use fontfall_types::ParsedFontMetadata;
use log::debug;
use std::borrow::Cow;

/// Reads TrueType/OpenType (and collection face 0) metrics with ttf-parser.
/// WOFF and WOFF2 input is unwrapped to sfnt first.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtfMetadataParser;

impl TtfMetadataParser {
    pub fn new() -> Self {
        Self
    }
}

impl FontMetadataParser for TtfMetadataParser {
    fn parse(&self, data: &[u8]) -> Result<ParsedFontMetadata, FontParseError> {
        let sfnt = unwrap_container(data)?;
        if let Cow::Owned(_) = sfnt {
            debug!("Unwrapped {} byte web font container to {} byte sfnt", data.len(), sfnt.len());
        }

        let face = ttf_parser::Face::parse(&sfnt, 0)
            .map_err(|e| FontParseError::UnrecognizedFormat(e.to_string()))?;

        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(FontParseError::Degenerate("unitsPerEm is zero".to_string()));
        }

        let family_name = extract_family_name(&face).unwrap_or_else(|| {
            debug!("Font has no Unicode family name record");
            String::new()
        });

        Ok(ParsedFontMetadata {
            units_per_em,
            ascent: f64::from(face.ascender()),
            descent: f64::from(face.descender()),
            line_gap: f64::from(face.line_gap()),
            cap_height: face.capital_height().map(f64::from),
            family_name,
        })
    }

    fn name(&self) -> &'static str {
        "TtfMetadataParser"
    }
}

/// Typographic family (nameID 16) first, then the legacy family (nameID 1).
fn extract_family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    [
        ttf_parser::name_id::TYPOGRAPHIC_FAMILY,
        ttf_parser::name_id::FAMILY,
    ]
    .into_iter()
    .find_map(|id| {
        face.names()
            .into_iter()
            .filter(|n| n.name_id == id)
            .find_map(|n| n.to_string())
    })
}
