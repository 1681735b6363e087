use rackquote_catalog::Catalog;
use rackquote_catalog::axis::Axis;

use super::{DeriveContext, FamilyStrategy, template_lines};
use crate::line::BomLine;

/// Stainless shelving: no form-type axis, four posts per rack.
pub struct StainlessStrategy;

impl FamilyStrategy for StainlessStrategy {
    fn required_axes(&self) -> &'static [Axis] {
        &[Axis::Size, Axis::Height, Axis::Level]
    }

    fn catalog_lines(&self, catalog: &Catalog, ctx: &DeriveContext<'_>) -> Option<Vec<BomLine>> {
        let path = [ctx.size_token, ctx.height_token, ctx.level_token, ctx.form.token()];
        template_lines(catalog, ctx, path)
    }

    fn fallback_lines(&self, ctx: &DeriveContext<'_>) -> Vec<BomLine> {
        let levels = ctx.levels.unwrap_or(0);
        vec![ctx.post_line(4), ctx.shelf_line(levels)]
    }
}
