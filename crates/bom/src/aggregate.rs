//! Consolidated BOM across every quoted item.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rackquote_core::{Amount, DomainError, DomainResult, Quantity, RackFamily};

use crate::cart::CartEntry;
use crate::line::BomLine;
use crate::naming::{canonical_name, is_excluded};
use crate::sort::sort_materials;
use crate::specification::complete_specification;

/// Aggregation identity of a BOM line.
///
/// Pallet and pallet steel-deck share parts, so their lines merge on name and
/// specification alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MergeKey {
    pub family: Option<RackFamily>,
    pub name: String,
    pub specification: String,
}

impl MergeKey {
    pub fn of(line: &BomLine) -> Self {
        Self {
            family: (!line.family.is_pallet()).then_some(line.family),
            name: canonical_name(&line.name),
            specification: line.specification.trim().to_string(),
        }
    }
}

/// Merged, sorted material list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedBom {
    lines: Vec<BomLine>,
}

impl AggregatedBom {
    pub fn lines(&self) -> &[BomLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<BomLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, key: &MergeKey) -> Option<&BomLine> {
        self.lines.iter().find(|l| MergeKey::of(l) == *key)
    }

    /// Sum of merged line totals.
    pub fn material_sum(&self) -> Amount {
        self.lines.iter().map(|l| l.total_price).sum()
    }

    /// Edit one aggregated quantity; the originating cart lines are untouched.
    pub fn set_quantity(&mut self, key: &MergeKey, quantity: Quantity) -> DomainResult<()> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| MergeKey::of(l) == *key)
            .ok_or_else(DomainError::not_found)?;
        line.quantity = quantity;
        line.recompute_total();
        Ok(())
    }
}

/// Merge lines by [`MergeKey`]; the first line seen supplies display fields.
pub fn aggregate_lines<'a>(lines: impl IntoIterator<Item = &'a BomLine>) -> AggregatedBom {
    let mut merged: Vec<BomLine> = Vec::new();
    let mut index: HashMap<MergeKey, usize> = HashMap::new();

    for line in lines {
        let mut line = line.clone();
        line.name = canonical_name(&line.name);
        if is_excluded(&line.name) || line.quantity == 0 {
            continue;
        }
        complete_specification(&mut line, None);
        let key = MergeKey::of(&line);
        match index.get(&key) {
            Some(&at) => {
                let existing = &mut merged[at];
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                existing.total_price = existing.total_price.saturating_add(line.total_price);
                existing.has_override |= line.has_override;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(line);
            }
        }
    }

    merged.retain(|l| !is_excluded(&l.name));
    for line in merged.iter_mut() {
        complete_specification(line, None);
    }
    sort_materials(&mut merged);
    AggregatedBom { lines: merged }
}

/// Aggregate the BOM snapshots of every cart entry.
pub fn aggregate(entries: &[CartEntry]) -> AggregatedBom {
    aggregate_lines(entries.iter().flat_map(|e| e.bom.iter()))
}
