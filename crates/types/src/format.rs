use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unexpected font file `{0}`: expected .woff, .woff2, .ttf, .otf or .eot")]
    UnknownExtension(String),
}

/// Font container formats that can appear in a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    Woff,
    Woff2,
    TrueType,
    OpenType,
    EmbeddedOpenType,
}

impl FontFormat {
    /// Infers the format from a path or URL extension.
    ///
    /// Query strings and fragments are ignored, the comparison is
    /// case-insensitive.
    pub fn from_path(path: &str) -> Result<Self, FormatError> {
        let stem = path.split(['?', '#']).next().unwrap_or(path);
        let ext = stem
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "woff" => Ok(FontFormat::Woff),
            "woff2" => Ok(FontFormat::Woff2),
            "ttf" => Ok(FontFormat::TrueType),
            "otf" => Ok(FontFormat::OpenType),
            "eot" => Ok(FontFormat::EmbeddedOpenType),
            _ => Err(FormatError::UnknownExtension(path.to_string())),
        }
    }

    /// Value for the CSS `format()` hint.
    pub fn css_format(&self) -> &'static str {
        match self {
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
            FontFormat::TrueType => "truetype",
            FontFormat::OpenType => "opentype",
            FontFormat::EmbeddedOpenType => "embedded-opentype",
        }
    }

    /// MIME type used for preload links and `data:` URLs.
    pub fn mime_type(&self) -> &'static str {
        match self {
            FontFormat::Woff => "font/woff",
            FontFormat::Woff2 => "font/woff2",
            FontFormat::TrueType => "font/ttf",
            FontFormat::OpenType => "font/otf",
            FontFormat::EmbeddedOpenType => "application/vnd.ms-fontobject",
        }
    }
}
