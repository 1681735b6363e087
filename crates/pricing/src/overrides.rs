//! Administrator price overrides and their change history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rackquote_bom::BomLine;
use rackquote_core::{Amount, PartId, RackFamily, ValueObject};

/// Lower and upper bound for the per-part history length.
pub const HISTORY_CAP_MIN: usize = 50;
pub const HISTORY_CAP_MAX: usize = 100;

pub fn clamp_history_cap(cap: usize) -> usize {
    cap.clamp(HISTORY_CAP_MIN, HISTORY_CAP_MAX)
}

/// What the resolver needs to know about a part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDescriptor {
    pub family: RackFamily,
    pub name: String,
    #[serde(default)]
    pub specification: String,
    /// Catalog or computed unit price carried by the line (0 when unknown).
    #[serde(default)]
    pub unit_price: Amount,
}

impl ValueObject for PartDescriptor {}

impl PartDescriptor {
    pub fn new(family: RackFamily, name: impl Into<String>, specification: impl Into<String>) -> Self {
        Self {
            family,
            name: name.into(),
            specification: specification.into(),
            unit_price: 0,
        }
    }

    pub fn with_unit_price(mut self, unit_price: Amount) -> Self {
        self.unit_price = unit_price;
        self
    }

    pub fn part_id(&self) -> PartId {
        PartId::new(self.family, &self.name, &self.specification)
    }

    /// `-name-specification` tail shared by every family variant.
    pub fn suffix(&self) -> String {
        PartId::suffix_for(&self.name, &self.specification)
    }
}

impl From<&BomLine> for PartDescriptor {
    fn from(line: &BomLine) -> Self {
        Self {
            family: line.family,
            name: line.name.clone(),
            specification: line.specification.clone(),
            unit_price: line.unit_price,
        }
    }
}

/// Family/name/specification recorded with an override for search and stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRecord {
    pub family: RackFamily,
    pub name: String,
    #[serde(default)]
    pub specification: String,
}

impl From<&PartDescriptor> for PartRecord {
    fn from(d: &PartDescriptor) -> Self {
        Self {
            family: d.family,
            name: d.name.clone(),
            specification: d.specification.clone(),
        }
    }
}

/// Administrator price for one part; supersedes the catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOverride {
    pub price: Amount,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub actor: String,
    /// Assigned by the repository on every write.
    #[serde(default)]
    pub revision: u64,
    /// Missing on records written before parts were tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<PartRecord>,
}

impl PriceOverride {
    pub fn new(price: Amount, actor: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            price,
            timestamp,
            actor: actor.into(),
            revision: 0,
            part: None,
        }
    }

    pub fn for_part(mut self, part: PartRecord) -> Self {
        self.part = Some(part);
        self
    }
}

/// One accepted override change, most recent first in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideHistoryEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub actor: String,
    pub old_price: Amount,
    pub new_price: Amount,
    #[serde(default)]
    pub label: String,
}

/// Full override state: current overrides plus per-part history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSnapshot {
    #[serde(default)]
    pub overrides: BTreeMap<PartId, PriceOverride>,
    #[serde(default)]
    pub history: BTreeMap<PartId, Vec<OverrideHistoryEntry>>,
}

impl OverrideSnapshot {
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_cap_is_clamped() {
        assert_eq!(clamp_history_cap(10), 50);
        assert_eq!(clamp_history_cap(75), 75);
        assert_eq!(clamp_history_cap(1000), 100);
    }

    #[test]
    fn descriptor_ids_share_the_suffix_across_families() {
        let a = PartDescriptor::new(RackFamily::Pallet, "Load Beam(2080)", "2080");
        let b = PartDescriptor::new(RackFamily::PalletSteelDeck, "Load Beam(2080)", "2080");
        assert_ne!(a.part_id(), b.part_id());
        assert!(a.part_id().has_suffix(&b.suffix()));
    }

    #[test]
    fn legacy_override_without_part_parses() {
        let json = r#"{ "price": 1200, "timestamp": "2024-03-01T09:00:00Z" }"#;
        let record: PriceOverride = serde_json::from_str(json).unwrap();
        assert_eq!(record.price, 1200);
        assert_eq!(record.part, None);
        assert_eq!(record.revision, 0);
    }
}
