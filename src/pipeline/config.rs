use crate::error::PipelineError;
use fontfall_types::FontCollection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// The on-disk build configuration: a list of font collections.
///
/// ```json
/// { "collections": [ { "name": "Inter", "fallback": "sans-serif",
///     "src": [ { "path": "./public/inter.ttf", "weight": 400 } ] } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default)]
    pub collections: Vec<FontCollection>,
}

impl BuildConfig {
    /// Reads and validates a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path_ref = path.as_ref();
        let source = fs::read_to_string(path_ref).map_err(|e| {
            PipelineError::Io(io::Error::new(
                e.kind(),
                format!("Failed to read config from '{}': {}", path_ref.display(), e),
            ))
        })?;
        Self::from_json(&source)
    }

    /// Parses and validates a configuration from a JSON string.
    pub fn from_json(source: &str) -> Result<Self, PipelineError> {
        let config: BuildConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects sources whose extension is not a known font format, and
    /// collections without a name.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for collection in &self.collections {
            if collection.name.trim().is_empty() {
                return Err(PipelineError::Config(
                    "Every collection needs a non-empty `name`.".to_string(),
                ));
            }
            collection.validate()?;
        }
        Ok(())
    }
}
