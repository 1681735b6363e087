//! BOM derivation: catalog template lookup with per-family fallback formulas.
//!
//! Each [`RackFamily`] is handled by one [`FamilyStrategy`]. A strategy first
//! tries the exact catalog template for the selection; when there is none (or
//! it carries no usable total) it computes quantities procedurally.

mod high_rack;
mod pallet;
mod shelving;
mod stainless;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rackquote_catalog::axis::{Axis, FormType, Selection, Size, front_number, parse_size};
use rackquote_catalog::{Catalog, CatalogComponent};
use rackquote_core::amount::deserialize_lenient;
use rackquote_core::{Amount, Quantity, RackFamily};

use crate::line::{ACCESSORY_NOTE, BomLine, CUSTOM_NOTE, LineOrigin};
use crate::naming::{self, PALLET_SAFETY_PIN_SPEC, PartKind, canonical_name, is_excluded};
use crate::specification::{
    complete_specification, depth_spec, height_spec, numeric_spec, size_spec, width_spec,
};

pub use high_rack::HighRackStrategy;
pub use pallet::{PalletStrategy, shelves_per_level};
pub use shelving::ShelvingStrategy;
pub use stainless::StainlessStrategy;

/// Free-form line a user adds to a light-duty quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLine {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub price: Amount,
}

impl CustomLine {
    pub fn new(name: impl Into<String>, price: Amount) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Everything a strategy needs to know about one completed selection.
#[derive(Debug, Clone)]
pub struct DeriveContext<'a> {
    pub family: RackFamily,
    pub selection: &'a Selection,
    pub quantity: Quantity,
    pub form: FormType,
    /// Displayed size token.
    pub size_token: &'a str,
    pub size: Option<Size>,
    pub height_token: &'a str,
    pub height_mm: u64,
    pub level_token: &'a str,
    pub levels: Option<u64>,
    /// Bare weight class (`550kg`) for high-rack; `None` elsewhere.
    pub weight: Option<String>,
}

impl<'a> DeriveContext<'a> {
    pub fn new(family: RackFamily, selection: &'a Selection, quantity: Quantity) -> Self {
        let size_token = selection.get(Axis::Size).unwrap_or_default();
        let weight = match family {
            RackFamily::HighRack => selection.weight_suffix(),
            _ => None,
        };
        Self {
            family,
            selection,
            quantity,
            form: FormType::from_selection(selection),
            size_token,
            size: parse_size(size_token),
            height_token: selection.get(Axis::Height).unwrap_or_default(),
            height_mm: selection.height_mm(),
            level_token: selection.get(Axis::Level).unwrap_or_default(),
            levels: selection.level_count(),
            weight,
        }
    }

    /// Width token for part names; the raw leading number when unparsed.
    pub fn width(&self) -> String {
        self.size
            .map(|s| s.width.to_string())
            .unwrap_or_else(|| front_number(self.size_token))
    }

    /// Token naming load beams: the depth for high-rack, the width elsewhere.
    pub fn load_beam_token(&self) -> String {
        if self.family == RackFamily::HighRack {
            self.depth()
        } else {
            self.width()
        }
    }

    pub fn depth(&self) -> String {
        self.size
            .map(|s| s.depth.to_string())
            .unwrap_or_else(|| front_number(self.size_token))
    }

    pub fn weight(&self) -> Option<&str> {
        self.weight.as_deref()
    }

    /// Per-rack count for the selected form type.
    pub fn by_form(&self, standalone: u64, connected: u64) -> u64 {
        if self.form.is_connected() { connected } else { standalone }
    }

    /// `per_rack × quantity`.
    pub fn times_qty(&self, per_rack: u64) -> Quantity {
        per_rack.saturating_mul(self.quantity)
    }

    pub fn computed(&self, name: String, specification: String, per_rack: u64) -> BomLine {
        BomLine::computed(self.family, name, specification, self.times_qty(per_rack))
    }

    pub fn post_line(&self, per_rack: u64) -> BomLine {
        self.computed(
            naming::post(self.height_token),
            height_spec(self.height_token, self.weight()),
            per_rack,
        )
    }

    pub fn shelf_line(&self, per_rack: u64) -> BomLine {
        self.computed(
            naming::shelf(self.width()),
            size_spec(self.size_token, self.weight()),
            per_rack,
        )
    }

    pub fn load_beam_line(&self, per_rack: u64) -> BomLine {
        let token = self.load_beam_token();
        self.computed(naming::load_beam(&token), numeric_spec(&token, self.weight()), per_rack)
    }
}

/// Per-family derivation.
pub trait FamilyStrategy: Send + Sync {
    /// Axes that must be set before anything is derived.
    fn required_axes(&self) -> &'static [Axis];

    /// Lines from the exact catalog template, or `None` when no usable
    /// template exists for the selection.
    fn catalog_lines(&self, catalog: &Catalog, ctx: &DeriveContext<'_>) -> Option<Vec<BomLine>>;

    /// Procedural quantities used when the catalog has nothing usable.
    fn fallback_lines(&self, ctx: &DeriveContext<'_>) -> Vec<BomLine>;
}

static LIGHT_DUTY: ShelvingStrategy = ShelvingStrategy::new(RackFamily::LightDuty);
static HEAVY_DUTY: ShelvingStrategy = ShelvingStrategy::new(RackFamily::HeavyDuty);
static PALLET: PalletStrategy = PalletStrategy::new(RackFamily::Pallet);
static PALLET_STEEL_DECK: PalletStrategy = PalletStrategy::new(RackFamily::PalletSteelDeck);
static HIGH_RACK: HighRackStrategy = HighRackStrategy;
static STAINLESS: StainlessStrategy = StainlessStrategy;

pub fn strategy_for(family: RackFamily) -> &'static dyn FamilyStrategy {
    match family {
        RackFamily::LightDuty => &LIGHT_DUTY,
        RackFamily::HeavyDuty => &HEAVY_DUTY,
        RackFamily::Pallet => &PALLET,
        RackFamily::PalletSteelDeck => &PALLET_STEEL_DECK,
        RackFamily::HighRack => &HIGH_RACK,
        RackFamily::Stainless => &STAINLESS,
    }
}

/// Map the template at `path` to lines, or `None` when it is missing or
/// carries no usable total.
pub(crate) fn template_lines(
    catalog: &Catalog,
    ctx: &DeriveContext<'_>,
    path: [&str; 4],
) -> Option<Vec<BomLine>> {
    let entry = catalog.templates.entry(ctx.family, path)?;
    if !entry.is_usable() {
        debug!(family = %ctx.family, path = ?path, "template has no usable total");
        return None;
    }
    Some(
        entry
            .components
            .iter()
            .filter(|c| !is_excluded(&c.name))
            .map(|c| respecify(ctx, c))
            .collect(),
    )
}

/// Catalog component → BOM line with the canonical name and specification.
fn respecify(ctx: &DeriveContext<'_>, component: &CatalogComponent) -> BomLine {
    let family = ctx.family;
    let weight = ctx.weight();
    let kind = PartKind::classify(&component.name);
    let (name, specification) = match kind {
        PartKind::Post => (naming::post(ctx.height_token), height_spec(ctx.height_token, weight)),
        PartKind::Shelf => (naming::shelf(ctx.width()), size_spec(ctx.size_token, weight)),
        PartKind::LoadBeam => {
            let token = ctx.load_beam_token();
            (naming::load_beam(&token), numeric_spec(&token, weight))
        }
        PartKind::TieBeam => {
            let depth = ctx.depth();
            (naming::tie_beam(&depth), numeric_spec(&depth, weight))
        }
        PartKind::CrossBar => {
            let width = ctx.width();
            (naming::cross_bar(&width), width_spec(&width))
        }
        PartKind::TopPad => (naming::top_pad(ctx.depth()), depth_spec(ctx.depth())),
        PartKind::BottomPad => (naming::bottom_pad(ctx.depth()), depth_spec(ctx.depth())),
        PartKind::SafetyPin if family.is_pallet() => {
            (naming::safety_pin(family), PALLET_SAFETY_PIN_SPEC.to_string())
        }
        PartKind::SafetyPin => (naming::safety_pin(family), family.label().to_string()),
        PartKind::SafetySeat => (naming::safety_seat(family), family.label().to_string()),
        PartKind::HorizontalBrace | PartKind::DiagonalBrace => {
            (canonical_name(&component.name), ctx.depth())
        }
        kind if kind.is_unspecified_hardware() => (canonical_name(&component.name), String::new()),
        _ => (
            canonical_name(&component.name),
            component.specification.trim().to_string(),
        ),
    };

    let quantity = component.quantity.saturating_mul(ctx.quantity);
    let total = if component.total_price > 0 {
        component.total_price.saturating_mul(ctx.quantity)
    } else {
        component.unit_price.saturating_mul(quantity)
    };
    BomLine::new(family, name, specification, quantity, component.unit_price, LineOrigin::Catalog)
        .with_total(total)
        .with_note(component.note.trim())
}

fn accessory_lines(catalog: &Catalog, ctx: &DeriveContext<'_>, extras: &[String]) -> Vec<BomLine> {
    extras
        .iter()
        .filter_map(|id| match catalog.accessories.find(ctx.family, id) {
            Some(accessory) => Some(
                BomLine::new(
                    ctx.family,
                    accessory.name.clone(),
                    accessory.specification.clone(),
                    ctx.quantity,
                    accessory.price,
                    LineOrigin::Accessory,
                )
                .with_note(ACCESSORY_NOTE),
            ),
            None => {
                warn!(family = %ctx.family, accessory = %id, "unknown accessory id ignored");
                None
            }
        })
        .collect()
}

fn custom_lines(ctx: &DeriveContext<'_>, custom: &[CustomLine]) -> Vec<BomLine> {
    if ctx.family != RackFamily::LightDuty {
        return Vec::new();
    }
    custom
        .iter()
        .filter(|c| !c.name.trim().is_empty())
        .map(|c| {
            BomLine::new(ctx.family, c.name.trim(), "", ctx.quantity, c.price, LineOrigin::Custom)
                .with_note(CUSTOM_NOTE)
        })
        .collect()
}

/// Canonicalize, filter and complete every derived line.
fn finalize(ctx: &DeriveContext<'_>, lines: Vec<BomLine>) -> Vec<BomLine> {
    lines
        .into_iter()
        .filter_map(|mut line| {
            line.name = canonical_name(&line.name);
            if line.name.is_empty() || line.quantity == 0 || is_excluded(&line.name) {
                return None;
            }
            if line.size.is_none() && !ctx.size_token.is_empty() {
                line.size = Some(ctx.size_token.to_string());
            }
            complete_specification(&mut line, ctx.weight());
            Some(line)
        })
        .collect()
}

/// Derive the unpriced BOM for one quoted item.
///
/// An incomplete selection or a zero quantity yields an empty list.
pub fn derive_bom(
    catalog: &Catalog,
    family: RackFamily,
    selection: &Selection,
    quantity: Quantity,
    extras: &[String],
    custom: &[CustomLine],
) -> Vec<BomLine> {
    let strategy = strategy_for(family);
    if quantity == 0 || !selection.has_all(strategy.required_axes()) {
        debug!(family = %family, "selection incomplete; nothing derived");
        return Vec::new();
    }

    let ctx = DeriveContext::new(family, selection, quantity);
    let mut lines = match strategy.catalog_lines(catalog, &ctx) {
        Some(lines) => {
            debug!(family = %family, lines = lines.len(), "derived from catalog template");
            lines
        }
        None => {
            let lines = strategy.fallback_lines(&ctx);
            debug!(family = %family, lines = lines.len(), "derived from fallback formulas");
            lines
        }
    };
    lines.extend(accessory_lines(catalog, &ctx, extras));
    lines.extend(custom_lines(&ctx, custom));
    finalize(&ctx, lines)
}
