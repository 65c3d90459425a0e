//! Cache keys derived from a collection's variant identities.

use fontfall_types::FontVariant;
use sha2::{Digest, Sha256};
use std::fmt;

const DOMAIN_TAG: &[u8] = b"fontfall-fallback-v1";

/// Lowercase hex SHA-256 over the ordered `(path, style, weight)` tuples.
///
/// Order sensitive, since variant order can affect selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

impl Fingerprint {
    pub fn of(variants: &[FontVariant]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_TAG);
        hasher.update((variants.len() as u64).to_be_bytes());
        for variant in variants {
            update_field(&mut hasher, variant.path.as_bytes());
            update_field(&mut hasher, variant.style.as_bytes());
            let weight = variant
                .weight
                .as_ref()
                .map(|w| w.canonical_key())
                .unwrap_or_else(|| "-".to_string());
            update_field(&mut hasher, weight.as_bytes());
        }
        Fingerprint(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for names that only need to be distinct
    /// within one build.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
