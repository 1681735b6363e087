//! The quoting facade: options, BOM, prices, cart and override administration.
//!
//! `QuoteEngine` composes a loaded [`Catalog`], a [`PriceResolver`] over an
//! injected [`OverrideRepository`] and an [`EventBus`] for price-change
//! notifications. Everything except override writes is a read over immutable
//! state; override writes are persisted first and then published.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rackquote_bom::{AggregatedBom, BomLine, Cart, CartEntry, aggregate};
use rackquote_catalog::{AvailableOptions, AxisChange, Catalog, Selection, SelectionState, reduce, resolve_options};
use rackquote_core::{Amount, CartEntryId, DomainResult, ExpectedVersion, RackFamily};
use rackquote_events::{EventBus, OverrideChanged, PriceEvent};
use rackquote_pricing::{
    Material, MaterialCatalog, OverrideMatch, OverrideRepository, OverrideSnapshot, OverrideStatistics,
    PartDescriptor, PriceResolver, ResolverSettings, SubtotalPolicy, apply_rate, compute_subtotal,
    search_overrides,
};

use crate::quote::{QuoteRequest, base_unit_price, custom_price, extras_price, is_priceable};

/// Tunables the engine is built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub resolver: ResolverSettings,
    pub subtotal_policy: SubtotalPolicy,
    /// Percent of list price charged (0..=100).
    pub apply_rate: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            resolver: ResolverSettings::default(),
            subtotal_policy: SubtotalPolicy::default(),
            apply_rate: 100.0,
        }
    }
}

/// Quote totals for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_sum: Amount,
    pub material_sum: Amount,
    pub material_count: usize,
    pub subtotal: Amount,
}

pub struct QuoteEngine<R, B> {
    catalog: Catalog,
    resolver: PriceResolver<R>,
    bus: B,
    settings: EngineSettings,
}

impl<R, B> QuoteEngine<R, B>
where
    R: OverrideRepository,
    B: EventBus<PriceEvent>,
{
    pub fn new(catalog: Catalog, overrides: R, bus: B) -> Self {
        Self::with_settings(catalog, overrides, bus, EngineSettings::default())
    }

    pub fn with_settings(catalog: Catalog, overrides: R, bus: B, settings: EngineSettings) -> Self {
        let materials = MaterialCatalog::from_catalog(&catalog);
        let resolver = PriceResolver::with_settings(overrides, settings.resolver).with_materials(materials);
        Self {
            catalog,
            resolver,
            bus,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &PriceResolver<R> {
        &self.resolver
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    // ---- selection ----

    pub fn resolve_options(&self, family: Option<RackFamily>, selection: &Selection) -> AvailableOptions {
        resolve_options(&self.catalog, family, selection)
    }

    pub fn reduce_selection(&self, state: &SelectionState, change: AxisChange) -> SelectionState {
        reduce(&self.catalog, state, change)
    }

    // ---- BOM and prices ----

    /// Priced, display-ordered BOM for one item.
    pub fn derive_bom(&self, request: &QuoteRequest) -> Vec<BomLine> {
        let mut lines = self.resolver.price_lines(request.unpriced_bom(&self.catalog).iter());
        rackquote_bom::sort_materials(&mut lines);
        lines
    }

    pub fn resolve_price(&self, part: &PartDescriptor) -> Amount {
        self.resolver.resolve_price(part)
    }

    pub fn sort_materials(&self, lines: &mut [BomLine]) {
        rackquote_bom::sort_materials(lines);
    }

    /// Rate-adjusted price of one quoted item; 0 for an incomplete selection.
    pub fn quote_price(&self, request: &QuoteRequest) -> Amount {
        if !is_priceable(request) {
            return 0;
        }
        let quantity = request.quantity;
        let base = match request.custom_unit_price.filter(|p| *p > 0) {
            Some(unit) => unit.saturating_mul(quantity),
            None => {
                let unit = base_unit_price(&self.catalog, &self.resolver, request);
                unit.saturating_mul(quantity)
                    .saturating_add(extras_price(&self.catalog, request))
                    .saturating_add(custom_price(request))
            }
        };
        apply_rate(base, self.settings.apply_rate)
    }

    // ---- cart ----

    /// Price the request, snapshot its BOM and add it to `cart`.
    pub fn add_to_cart(&self, cart: &mut Cart, request: QuoteRequest) -> DomainResult<CartEntryId> {
        let price = self.quote_price(&request);
        let bom = self.derive_bom(&request);
        let entry = CartEntry::new(request.family, request.selection, request.quantity, price, bom)
            .with_extras(request.extra_option_ids)
            .with_custom_lines(request.custom_lines);
        let id = cart.add(entry)?;
        debug!(entry = %id, price, "item added to cart");
        Ok(id)
    }

    pub fn aggregate(&self, cart: &Cart) -> AggregatedBom {
        aggregate(cart.entries())
    }

    pub fn compute_subtotal(&self, item_sum: Amount, material_sum: Amount, material_count: usize) -> Amount {
        compute_subtotal(item_sum, material_sum, material_count, self.settings.subtotal_policy)
    }

    pub fn cart_totals(&self, cart: &Cart) -> CartTotals {
        let materials = self.aggregate(cart);
        let item_sum = cart.total();
        let material_sum = materials.material_sum();
        let material_count = materials.len();
        CartTotals {
            item_sum,
            material_sum,
            material_count,
            subtotal: self.compute_subtotal(item_sum, material_sum, material_count),
        }
    }

    /// Re-resolve every cart line the event touches; returns how many changed.
    pub fn on_price_event(&self, event: &PriceEvent, cart: &mut Cart) -> usize {
        let suffix_fallback = self.resolver.settings().suffix_fallback;
        let mut changed = 0;
        for entry in cart.entries_mut() {
            for line in entry.bom.iter_mut().filter(|l| !l.is_custom()) {
                if !touches(event, line, suffix_fallback) {
                    continue;
                }
                let priced = self.resolver.price_line(line);
                if priced != *line {
                    *line = priced;
                    changed += 1;
                }
            }
        }
        debug!(event = ?event, changed, "cart repriced");
        changed
    }

    // ---- overrides ----

    /// Persist an override change, then announce it on the bus.
    ///
    /// A publish failure is logged; the override is already stored.
    pub fn update_override(
        &self,
        part: &PartDescriptor,
        new_price: f64,
        label: &str,
        actor: &str,
        expected: ExpectedVersion,
    ) -> DomainResult<OverrideChanged> {
        let changed = self.resolver.update_override(part, new_price, label, actor, expected)?;
        self.publish(PriceEvent::OverrideChanged(changed.clone()));
        Ok(changed)
    }

    /// Replace the whole override store (restore from backup).
    pub fn restore_overrides(&self, snapshot: OverrideSnapshot) -> DomainResult<()> {
        let count = snapshot.overrides.len();
        self.resolver.overrides().restore(snapshot)?;
        info!(overrides = count, "override store restored");
        self.publish(PriceEvent::OverridesReloaded { occurred_at: Utc::now() });
        Ok(())
    }

    pub fn override_snapshot(&self) -> DomainResult<OverrideSnapshot> {
        self.resolver.overrides().snapshot()
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> DomainResult<OverrideStatistics> {
        Ok(OverrideStatistics::collect(&self.override_snapshot()?, now))
    }

    pub fn search_overrides(&self, term: &str, family: Option<RackFamily>) -> DomainResult<Vec<OverrideMatch>> {
        Ok(search_overrides(&self.override_snapshot()?, term, family))
    }

    pub fn search_materials(&self, term: &str, family: Option<RackFamily>) -> Vec<&Material> {
        self.resolver
            .materials()
            .map(|m| m.search(term, family))
            .unwrap_or_default()
    }

    fn publish(&self, event: PriceEvent) {
        if let Err(err) = self.bus.publish(event) {
            warn!(error = %err, "price event not published");
        }
    }
}

fn touches(event: &PriceEvent, line: &BomLine, suffix_fallback: bool) -> bool {
    let part_id = line.part_id();
    if event.affects(&part_id) {
        return true;
    }
    match event {
        PriceEvent::OverrideChanged(change) if suffix_fallback => {
            change.part_id.has_suffix(&PartDescriptor::from(line).suffix())
        }
        _ => false,
    }
}
