use rackquote_catalog::Catalog;
use rackquote_catalog::axis::Axis;
use rackquote_catalog::options::high_rack_data_size;

use super::{DeriveContext, FamilyStrategy, template_lines};
use crate::line::BomLine;

/// Shelves per level by frame depth token.
fn shelves_per_level(depth: u64) -> u64 {
    match depth {
        108 => 1,
        150 | 200 => 2,
        _ => 1,
    }
}

/// High-rack: weight class first; heavy classes are catalogued under an
/// aliased size token.
pub struct HighRackStrategy;

impl FamilyStrategy for HighRackStrategy {
    fn required_axes(&self) -> &'static [Axis] {
        &[
            Axis::WeightClass,
            Axis::Size,
            Axis::Height,
            Axis::Level,
            Axis::FormType,
        ]
    }

    fn catalog_lines(&self, catalog: &Catalog, ctx: &DeriveContext<'_>) -> Option<Vec<BomLine>> {
        let weight = ctx.selection.get(Axis::WeightClass).unwrap_or_default();
        let data_size = high_rack_data_size(weight, ctx.size_token);
        let path = [data_size, ctx.height_token, ctx.level_token, ctx.form.token()];
        template_lines(catalog, ctx, path)
    }

    fn fallback_lines(&self, ctx: &DeriveContext<'_>) -> Vec<BomLine> {
        let levels = ctx.levels.unwrap_or(0);
        let depth = ctx.size.map(|s| s.depth).unwrap_or(0);
        vec![
            ctx.post_line(ctx.by_form(4, 2)),
            ctx.load_beam_line(2 * levels),
            ctx.shelf_line(shelves_per_level(depth) * levels),
        ]
    }
}
