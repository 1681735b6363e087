//! Quote requests and item pricing against the catalog.

use serde::{Deserialize, Serialize};
use tracing::debug;

use rackquote_bom::{BomLine, CustomLine, LineOrigin, derive_bom};
use rackquote_catalog::axis::{Axis, Selection};
use rackquote_catalog::options::{catalog_height, high_rack_data_size};
use rackquote_catalog::Catalog;
use rackquote_core::amount::first_integer;
use rackquote_core::{Amount, Quantity, RackFamily};
use rackquote_pricing::{OverrideRepository, PriceResolver};

/// One item to quote: a family, its axis values and how many racks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub family: RackFamily,
    #[serde(default)]
    pub selection: Selection,
    pub quantity: Quantity,
    #[serde(default)]
    pub extra_option_ids: Vec<String>,
    #[serde(default)]
    pub custom_lines: Vec<CustomLine>,
    /// Manually agreed per-rack price; replaces every catalog lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_unit_price: Option<Amount>,
}

impl QuoteRequest {
    pub fn new(family: RackFamily, selection: Selection, quantity: Quantity) -> Self {
        Self {
            family,
            selection,
            quantity,
            extra_option_ids: Vec::new(),
            custom_lines: Vec::new(),
            custom_unit_price: None,
        }
    }

    pub fn with_extras(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_option_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_custom_lines(mut self, lines: Vec<CustomLine>) -> Self {
        self.custom_lines = lines;
        self
    }

    pub fn with_custom_unit_price(mut self, price: Amount) -> Self {
        self.custom_unit_price = Some(price);
        self
    }

    pub(crate) fn unpriced_bom(&self, catalog: &Catalog) -> Vec<BomLine> {
        derive_bom(
            catalog,
            self.family,
            &self.selection,
            self.quantity,
            &self.extra_option_ids,
            &self.custom_lines,
        )
    }
}

/// Per-rack base price from the price table, or from the template when the
/// table has no entry.
pub(crate) fn base_unit_price<R>(catalog: &Catalog, resolver: &PriceResolver<R>, request: &QuoteRequest) -> Amount
where
    R: OverrideRepository,
{
    let family = request.family;
    let sel = &request.selection;
    let get = |axis| sel.get(axis).unwrap_or_default();

    match family {
        RackFamily::HighRack => {
            let weight = get(Axis::WeightClass);
            let path = [weight, high_rack_data_size(weight, get(Axis::Size)), get(Axis::Height), get(Axis::Level)];
            catalog.prices.price(family, &path).unwrap_or(0)
        }
        RackFamily::Stainless => catalog
            .prices
            .price(family, &[get(Axis::Size), get(Axis::Height), get(Axis::Level)])
            .unwrap_or(0),
        _ => {
            let size = get(Axis::Size);
            let height = catalog_height(family, get(Axis::Height));
            let level = get(Axis::Level);
            let form = get(Axis::FormType);

            let listed = if family == RackFamily::PalletSteelDeck {
                let height_key = height.trim_start_matches(['H', 'h']);
                let level_key = format!("{}단", first_integer(level).unwrap_or(0));
                catalog.prices.price(family, &[form, size, height_key, level_key.as_str()])
            } else {
                catalog.prices.price(family, &[size, height, level, form])
            };
            listed.unwrap_or_else(|| template_unit_price(catalog, resolver, request, [size, height, level, form]))
        }
    }
}

/// Declared template total unless an override touches one of its parts, in
/// which case the override-aware component sum.
fn template_unit_price<R>(
    catalog: &Catalog,
    resolver: &PriceResolver<R>,
    request: &QuoteRequest,
    path: [&str; 4],
) -> Amount
where
    R: OverrideRepository,
{
    let Some(entry) = catalog.templates.entry(request.family, path) else {
        return 0;
    };
    let single = QuoteRequest::new(request.family, request.selection.clone(), 1);
    let lines: Vec<BomLine> = resolver
        .price_lines(single.unpriced_bom(catalog).iter())
        .into_iter()
        .filter(|l| l.origin == LineOrigin::Catalog)
        .collect();

    let declared = entry.usable_total();
    if declared > 0 && !lines.iter().any(|l| l.has_override) {
        declared
    } else {
        debug!(family = %request.family, "template priced from components");
        lines.iter().map(|l| l.total_price).sum()
    }
}

/// Accessory prices (per item, not per rack).
pub(crate) fn extras_price(catalog: &Catalog, request: &QuoteRequest) -> Amount {
    request
        .extra_option_ids
        .iter()
        .filter_map(|id| catalog.accessories.find(request.family, id))
        .map(|a| a.price)
        .sum()
}

/// Custom line prices; light-duty only.
pub(crate) fn custom_price(request: &QuoteRequest) -> Amount {
    if request.family != RackFamily::LightDuty {
        return 0;
    }
    request.custom_lines.iter().map(|c| c.price).sum()
}

/// High-rack cannot be priced until its form type is chosen.
pub(crate) fn is_priceable(request: &QuoteRequest) -> bool {
    request.quantity > 0
        && (request.family != RackFamily::HighRack || request.selection.get(Axis::FormType).is_some())
}
