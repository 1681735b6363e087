//! Administrator views over the override store.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use rackquote_core::{PartId, RackFamily};

use crate::overrides::{OverrideSnapshot, PriceOverride};

/// Window for [`OverrideStatistics::recent_changes`].
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideStatistics {
    pub total_overrides: usize,
    pub history_entries: usize,
    pub per_family: BTreeMap<RackFamily, usize>,
    /// Overrides whose record carries no family.
    pub unclassified: usize,
    /// Overrides written within the last seven days.
    pub recent_changes: usize,
    pub last_modified: Option<DateTime<Utc>>,
}

impl OverrideStatistics {
    pub fn collect(snapshot: &OverrideSnapshot, now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let mut stats = Self {
            total_overrides: snapshot.overrides.len(),
            history_entries: snapshot.history.values().map(Vec::len).sum(),
            ..Self::default()
        };

        for record in snapshot.overrides.values() {
            match record.part.as_ref() {
                Some(part) => *stats.per_family.entry(part.family).or_default() += 1,
                None => stats.unclassified += 1,
            }
            if record.timestamp > cutoff {
                stats.recent_changes += 1;
            }
            stats.last_modified = stats.last_modified.max(Some(record.timestamp));
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideMatch {
    pub part_id: PartId,
    pub record: PriceOverride,
}

impl OverrideMatch {
    /// `name (specification)`, with placeholders for legacy records.
    pub fn display_name(&self) -> String {
        match &self.record.part {
            Some(part) if part.specification.is_empty() => format!("{} (-)", part.name),
            Some(part) => format!("{} ({})", part.name, part.specification),
            None => format!("{} (-)", self.part_id),
        }
    }
}

/// Case-insensitive match on key, name and specification, most recent first.
/// The family filter only matches records that carry a family.
pub fn search_overrides(
    snapshot: &OverrideSnapshot,
    term: &str,
    family: Option<RackFamily>,
) -> Vec<OverrideMatch> {
    let needle = term.trim().to_lowercase();
    let mut found: Vec<OverrideMatch> = snapshot
        .overrides
        .iter()
        .filter(|(_, record)| {
            family.is_none_or(|f| record.part.as_ref().is_some_and(|p| p.family == f))
        })
        .filter(|(id, record)| {
            needle.is_empty()
                || id.as_str().to_lowercase().contains(&needle)
                || record.part.as_ref().is_some_and(|p| {
                    p.name.to_lowercase().contains(&needle)
                        || p.specification.to_lowercase().contains(&needle)
                })
        })
        .map(|(id, record)| OverrideMatch {
            part_id: id.clone(),
            record: record.clone(),
        })
        .collect();
    found.sort_by(|a, b| b.record.timestamp.cmp(&a.record.timestamp));
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{OverrideHistoryEntry, PartRecord};

    fn record(family: Option<RackFamily>, name: &str, age_days: i64, now: DateTime<Utc>) -> PriceOverride {
        let mut r = PriceOverride::new(1000, "admin", now - Duration::days(age_days));
        if let Some(family) = family {
            r = r.for_part(PartRecord {
                family,
                name: name.to_string(),
                specification: "Height H4500".into(),
            });
        }
        r
    }

    fn snapshot(now: DateTime<Utc>) -> OverrideSnapshot {
        let mut snap = OverrideSnapshot::default();
        snap.overrides.insert(
            PartId::from_raw("pallet-posth4500-heighth4500"),
            record(Some(RackFamily::Pallet), "Post(H4500)", 1, now),
        );
        snap.overrides.insert(
            PartId::from_raw("high-rack-loadbeam60-60"),
            record(Some(RackFamily::HighRack), "Load Beam(60)", 30, now),
        );
        snap.overrides.insert(PartId::from_raw("old-anchorbolt-"), record(None, "", 3, now));
        snap.history.insert(
            PartId::from_raw("pallet-posth4500-heighth4500"),
            vec![OverrideHistoryEntry {
                timestamp: now,
                actor: "admin".into(),
                old_price: 900,
                new_price: 1000,
                label: String::new(),
            }; 3],
        );
        snap
    }

    #[test]
    fn statistics_count_families_and_recent_changes() {
        let now = Utc::now();
        let stats = OverrideStatistics::collect(&snapshot(now), now);
        assert_eq!(stats.total_overrides, 3);
        assert_eq!(stats.history_entries, 3);
        assert_eq!(stats.per_family.get(&RackFamily::Pallet), Some(&1));
        assert_eq!(stats.unclassified, 1);
        assert_eq!(stats.recent_changes, 2);
        assert_eq!(stats.last_modified, Some(now - Duration::days(1)));
    }

    #[test]
    fn empty_store_has_no_last_modified() {
        let stats = OverrideStatistics::collect(&OverrideSnapshot::default(), Utc::now());
        assert_eq!(stats, OverrideStatistics::default());
    }

    #[test]
    fn search_matches_key_and_name_most_recent_first() {
        let now = Utc::now();
        let snap = snapshot(now);

        let all = search_overrides(&snap, "", None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].part_id.as_str(), "pallet-posth4500-heighth4500");
        assert_eq!(all[2].part_id.as_str(), "high-rack-loadbeam60-60");

        let by_name = search_overrides(&snap, "LOAD beam", None);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].display_name(), "Load Beam(60) (Height H4500)");

        let by_key = search_overrides(&snap, "anchorbolt", None);
        assert_eq!(by_key.len(), 1);

        assert_eq!(search_overrides(&snap, "", Some(RackFamily::Pallet)).len(), 1);
    }
}
