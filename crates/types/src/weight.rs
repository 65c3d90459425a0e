use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// A configured `font-weight` value, kept as written.
///
/// Config files carry weights either as JSON numbers (`400`) or as strings
/// (`"400"`, `"bold"`, `"100 900"`). Interpretation is left to the selector so
/// that the raw value stays part of the variant identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FontWeight {
    Number(f32),
    Text(String),
}

impl FontWeight {
    /// Stable textual form used when fingerprinting a variant.
    ///
    /// Numbers and strings get distinct prefixes so `400` and `"400"` never
    /// produce the same key.
    pub fn canonical_key(&self) -> String {
        match self {
            FontWeight::Number(n) => format!("n:{}", n),
            FontWeight::Text(s) => format!("t:{}", s),
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Number(n) => write!(f, "{}", n),
            FontWeight::Text(s) => f.write_str(s),
        }
    }
}

impl From<u16> for FontWeight {
    fn from(value: u16) -> Self {
        FontWeight::Number(f32::from(value))
    }
}

impl From<&str> for FontWeight {
    fn from(value: &str) -> Self {
        FontWeight::Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum FontWeightDef {
            Str(String),
            Num(f64),
        }

        match FontWeightDef::deserialize(deserializer)? {
            FontWeightDef::Str(s) => Ok(FontWeight::Text(s)),
            FontWeightDef::Num(n) if n.is_finite() => Ok(FontWeight::Number(n as f32)),
            FontWeightDef::Num(n) => Err(de::Error::custom(format!("Invalid font weight: {}", n))),
        }
    }
}
