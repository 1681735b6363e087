//! Deterministic part identifiers.

use serde::{Deserialize, Serialize};

use crate::family::RackFamily;
use crate::value_object::ValueObject;

/// Normalize one identifier segment: keep ASCII word characters and Hangul
/// syllables, drop everything else, lowercase.
pub fn normalize_segment(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || is_hangul_syllable(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Identity of a distinct component + specification pair within a family.
///
/// Layout: `family-name-specification`, each segment normalized. The
/// `-name-specification` tail is the *suffix* used to match records that were
/// stored without a family segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl ValueObject for PartId {}

impl PartId {
    pub fn new(family: RackFamily, name: &str, specification: &str) -> Self {
        Self::from_segments(family.slug(), name, specification)
    }

    /// Build from an arbitrary family token (legacy records may carry labels).
    pub fn from_segments(family: &str, name: &str, specification: &str) -> Self {
        Self(format!(
            "{}{}",
            normalize_segment(family),
            Self::suffix_for(name, specification)
        ))
    }

    /// Wrap an already-derived key (e.g. read back from a store).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// `-name-specification` tail shared by every family variant of a part.
    pub fn suffix_for(name: &str, specification: &str) -> String {
        format!("-{}-{}", normalize_segment(name), normalize_segment(specification))
    }

    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
