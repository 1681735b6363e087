//! Layered unit-price resolution: administrator override over catalog price.

use core::cmp::Reverse;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use rackquote_bom::BomLine;
use rackquote_core::amount::coerce_amount;
use rackquote_core::{Amount, DomainError, DomainResult, ExpectedVersion, PartId};
use rackquote_events::OverrideChanged;

use crate::materials::MaterialCatalog;
use crate::overrides::{
    HISTORY_CAP_MAX, OverrideHistoryEntry, PartDescriptor, PartRecord, PriceOverride, clamp_history_cap,
};
use crate::repository::OverrideRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Match overrides stored under another family's key by name+specification.
    pub suffix_fallback: bool,
    /// Per-part history length, clamped to 50..=100.
    pub history_cap: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            suffix_fallback: true,
            history_cap: HISTORY_CAP_MAX,
        }
    }
}

/// Which layer supplied a resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Override,
    SuffixOverride,
    Line,
    MaterialCatalog,
    Unpriced,
}

impl PriceSource {
    pub fn is_override(self) -> bool {
        matches!(self, PriceSource::Override | PriceSource::SuffixOverride)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub amount: Amount,
    pub source: PriceSource,
}

impl ResolvedPrice {
    fn new(amount: Amount, source: PriceSource) -> Self {
        Self { amount, source }
    }
}

/// Resolves unit prices against an [`OverrideRepository`].
///
/// Resolution never fails: a repository error is logged and resolution falls
/// through to catalog prices.
pub struct PriceResolver<R> {
    overrides: R,
    settings: ResolverSettings,
    materials: Option<MaterialCatalog>,
}

impl<R> PriceResolver<R>
where
    R: OverrideRepository,
{
    pub fn new(overrides: R) -> Self {
        Self::with_settings(overrides, ResolverSettings::default())
    }

    pub fn with_settings(overrides: R, settings: ResolverSettings) -> Self {
        Self {
            overrides,
            settings: ResolverSettings {
                history_cap: clamp_history_cap(settings.history_cap),
                ..settings
            },
            materials: None,
        }
    }

    pub fn with_materials(mut self, materials: MaterialCatalog) -> Self {
        self.materials = Some(materials);
        self
    }

    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    pub fn materials(&self) -> Option<&MaterialCatalog> {
        self.materials.as_ref()
    }

    pub fn overrides(&self) -> &R {
        &self.overrides
    }

    /// Effective unit price for `part`; 0 when nothing is known.
    pub fn resolve_price(&self, part: &PartDescriptor) -> Amount {
        self.resolve_with_source(part).amount
    }

    pub fn resolve_with_source(&self, part: &PartDescriptor) -> ResolvedPrice {
        let part_id = part.part_id();

        match self.overrides.get(&part_id) {
            Ok(Some(record)) if record.price > 0 => {
                return ResolvedPrice::new(record.price, PriceSource::Override);
            }
            Ok(_) => {}
            Err(err) => warn!(part_id = %part_id, error = %err, "override lookup failed"),
        }

        if self.settings.suffix_fallback {
            if let Some(price) = self.suffix_override(&part.suffix()) {
                return ResolvedPrice::new(price, PriceSource::SuffixOverride);
            }
        }

        if part.unit_price > 0 {
            return ResolvedPrice::new(part.unit_price, PriceSource::Line);
        }

        if let Some(price) = self.materials.as_ref().and_then(|m| m.price(&part_id)) {
            return ResolvedPrice::new(price, PriceSource::MaterialCatalog);
        }

        ResolvedPrice::new(0, PriceSource::Unpriced)
    }

    /// Most recent positive override sharing `suffix`; ties go to the
    /// smallest key.
    fn suffix_override(&self, suffix: &str) -> Option<Amount> {
        let all = match self.overrides.list() {
            Ok(all) => all,
            Err(err) => {
                warn!(error = %err, "override listing failed; suffix fallback skipped");
                return None;
            }
        };
        all.into_iter()
            .filter(|(id, record)| record.price > 0 && id.has_suffix(suffix))
            .max_by_key(|(id, record)| (record.timestamp, Reverse(id.clone())))
            .map(|(_, record)| record.price)
    }

    /// `line` with its unit price resolved.
    ///
    /// Overrides recompute the total and mark the line; a declared catalog
    /// total is otherwise kept. A line priced by an override that has since
    /// been removed falls back to the material catalog. Custom lines carry
    /// user-entered prices and are returned unchanged.
    pub fn price_line(&self, line: &BomLine) -> BomLine {
        let mut priced = line.clone();
        if line.is_custom() {
            return priced;
        }

        let mut part = PartDescriptor::from(line);
        if line.has_override {
            part.unit_price = self
                .materials
                .as_ref()
                .and_then(|m| m.price(&part.part_id()))
                .unwrap_or(0);
        }
        let resolved = self.resolve_with_source(&part);
        priced.has_override = resolved.source.is_override();
        match (resolved.source, line.has_override) {
            (PriceSource::Line | PriceSource::Unpriced, false) => {}
            _ => {
                priced.unit_price = resolved.amount;
                priced.recompute_total();
            }
        }
        priced
    }

    pub fn price_lines<'a>(&self, lines: impl IntoIterator<Item = &'a BomLine>) -> Vec<BomLine> {
        lines.into_iter().map(|l| self.price_line(l)).collect()
    }

    /// Set or clear the administrator price for `part`.
    ///
    /// A price that rounds to 0 removes the override. Returns the change to
    /// publish on the price event bus.
    pub fn update_override(
        &self,
        part: &PartDescriptor,
        new_price: f64,
        label: &str,
        actor: &str,
        expected: ExpectedVersion,
    ) -> DomainResult<OverrideChanged> {
        validate_price(new_price)?;
        let price = coerce_amount(new_price);
        let part_id = part.part_id();
        let old_price = self.resolve_price(part);
        let now = Utc::now();

        let change = (price > 0).then(|| PriceOverride::new(price, actor, now).for_part(PartRecord::from(part)));
        let entry = OverrideHistoryEntry {
            timestamp: now,
            actor: actor.to_string(),
            old_price,
            new_price: price,
            label: label.to_string(),
        };
        let revision = self
            .overrides
            .record_change(&part_id, change, expected, entry, self.settings.history_cap)?;

        info!(
            part_id = %part_id,
            old_price,
            new_price = price,
            revision,
            actor,
            "price override updated"
        );

        Ok(OverrideChanged {
            part_id,
            old_price,
            new_price: price,
            actor: actor.to_string(),
            revision,
            occurred_at: now,
        })
    }

    pub fn history(&self, part_id: &PartId) -> DomainResult<Vec<OverrideHistoryEntry>> {
        self.overrides.history(part_id)
    }
}

fn validate_price(value: f64) -> DomainResult<()> {
    if !value.is_finite() {
        return Err(DomainError::validation("price must be a finite number"));
    }
    if value < 0.0 {
        return Err(DomainError::validation("price must not be negative"));
    }
    Ok(())
}

/// Parse administrator input (`"1,200"`, `" 900 "`).
pub fn parse_price(input: &str) -> DomainResult<f64> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| DomainError::validation(format!("not a number: '{}'", input.trim())))?;
    validate_price(value)?;
    Ok(value)
}
