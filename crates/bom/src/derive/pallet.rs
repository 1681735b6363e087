//! Pallet racks and their steel-deck variant.

use rackquote_catalog::Catalog;
use rackquote_catalog::axis::Axis;
use rackquote_core::RackFamily;

use super::{DeriveContext, FamilyStrategy, template_lines};
use crate::line::BomLine;
use crate::naming::{
    self, ANCHOR_BOLT, BRACING_BOLT, BRACING_RUBBER, DIAGONAL_BRACE, HORIZONTAL_BRACE,
    PALLET_SAFETY_PIN_SPEC, PartKind,
};
use crate::specification::numeric_spec;

/// Height below which no extra bracing steps are added (mm).
const BRACING_BASE_MM: u64 = 1500;
const BRACING_STEP_MM: u64 = 500;

/// Steel-deck panel anchors: (rack width mm, panels per level).
const DECK_ANCHORS: [(u64, u64); 3] = [(1300, 1), (2000, 2), (2580, 3)];

/// Steel-deck panels per level for a rack width.
///
/// Linear over [`DECK_ANCHORS`], rounded half up, at least one; widths past
/// the last anchor extrapolate along the last segment.
pub fn shelves_per_level(width: u64) -> u64 {
    let (first_w, first_n) = DECK_ANCHORS[0];
    if width <= first_w {
        return first_n;
    }
    let segment = DECK_ANCHORS
        .windows(2)
        .find(|w| width <= w[1].0)
        .unwrap_or(&DECK_ANCHORS[DECK_ANCHORS.len() - 2..]);
    let ((x0, y0), (x1, y1)) = (segment[0], segment[1]);
    let dx = x1 - x0;
    let dy = y1 - y0;
    let steps = ((width - x0) * dy * 2 + dx) / (2 * dx);
    (y0 + steps).max(1)
}

/// Extra bracing steps above the base height.
fn bracing_steps(height_mm: u64) -> u64 {
    height_mm.saturating_sub(BRACING_BASE_MM) / BRACING_STEP_MM
}

pub struct PalletStrategy {
    family: RackFamily,
}

impl PalletStrategy {
    pub const fn new(family: RackFamily) -> Self {
        Self { family }
    }

    fn steel_deck(&self) -> bool {
        self.family == RackFamily::PalletSteelDeck
    }

    /// Template parts this family never ships: safety seats for every pallet
    /// rack, tie beams and steel plates for the steel-deck variant.
    fn omits(&self, kind: PartKind) -> bool {
        match kind {
            PartKind::SafetySeat => true,
            PartKind::TieBeam | PartKind::SteelPlate => self.steel_deck(),
            _ => false,
        }
    }

    /// Fallback beams are named by the width rounded down to the hundred.
    fn fallback_load_beams(&self, ctx: &DeriveContext<'_>, levels: u64) -> BomLine {
        let token = ctx
            .size
            .map(|s| (s.width / 100 * 100).to_string())
            .unwrap_or_else(|| ctx.width());
        ctx.computed(naming::load_beam(&token), numeric_spec(&token, None), 2 * levels)
    }

    fn safety_pins(&self, ctx: &DeriveContext<'_>, levels: u64) -> BomLine {
        ctx.computed(
            naming::safety_pin(self.family),
            PALLET_SAFETY_PIN_SPEC.to_string(),
            2 * levels * 2,
        )
    }

    fn deck_shelves(&self, ctx: &DeriveContext<'_>, levels: u64) -> Option<BomLine> {
        if !self.steel_deck() {
            return None;
        }
        let width = ctx.size.map(|s| s.width).unwrap_or(0);
        Some(ctx.shelf_line(shelves_per_level(width) * levels))
    }

    /// Horizontal/diagonal braces, their bolts, anchors and rubbers.
    fn bracing(&self, ctx: &DeriveContext<'_>, posts: u64) -> Vec<BomLine> {
        let steps = bracing_steps(ctx.height_mm);
        let depth = ctx.depth();
        let connected = ctx.form.is_connected();
        let bolts = 10 + 2 * steps;
        vec![
            ctx.computed(HORIZONTAL_BRACE.to_string(), depth.clone(), ctx.by_form(4, 2)),
            ctx.computed(
                DIAGONAL_BRACE.to_string(),
                depth,
                ctx.by_form(4 + 2 * steps, 2 + steps),
            ),
            ctx.computed(ANCHOR_BOLT.to_string(), String::new(), ctx.by_form(4, 2)),
            ctx.computed(
                BRACING_BOLT.to_string(),
                String::new(),
                if connected { bolts / 2 } else { bolts },
            ),
            BomLine::computed(ctx.family, BRACING_RUBBER, "", posts),
        ]
    }

    /// Hardware appended to a catalog BOM when the template omits it.
    fn supplementary(&self, ctx: &DeriveContext<'_>, posts: u64) -> Vec<BomLine> {
        let levels = ctx.levels.unwrap_or(0);
        let mut lines = vec![self.safety_pins(ctx, levels)];
        lines.extend(self.deck_shelves(ctx, levels));
        lines.extend(self.bracing(ctx, posts));
        lines
    }
}

impl FamilyStrategy for PalletStrategy {
    fn required_axes(&self) -> &'static [Axis] {
        &[Axis::Size, Axis::Height, Axis::Level, Axis::FormType]
    }

    fn catalog_lines(&self, catalog: &Catalog, ctx: &DeriveContext<'_>) -> Option<Vec<BomLine>> {
        let path = [ctx.size_token, ctx.height_token, ctx.level_token, ctx.form.token()];
        let mut lines = template_lines(catalog, ctx, path)?;
        lines.retain(|l| !self.omits(PartKind::classify(&l.name)));

        let posts: u64 = lines
            .iter()
            .filter(|l| PartKind::classify(&l.name) == PartKind::Post)
            .map(|l| l.quantity)
            .sum();
        let posts = if posts > 0 { posts } else { ctx.times_qty(ctx.by_form(4, 2)) };

        for extra in self.supplementary(ctx, posts) {
            let kind = PartKind::classify(&extra.name);
            if !lines.iter().any(|l| PartKind::classify(&l.name) == kind) {
                lines.push(extra);
            }
        }
        Some(lines)
    }

    fn fallback_lines(&self, ctx: &DeriveContext<'_>) -> Vec<BomLine> {
        let levels = ctx.levels.unwrap_or(0);
        let posts = ctx.post_line(ctx.by_form(4, 2));
        let post_count = posts.quantity;

        let mut lines = vec![posts, self.fallback_load_beams(ctx, levels)];
        if !self.steel_deck() {
            let depth = ctx.depth();
            lines.push(ctx.computed(
                naming::tie_beam(&depth),
                numeric_spec(&depth, None),
                2 * levels,
            ));
        }
        lines.extend(self.supplementary(ctx, post_count));
        lines
    }
}
