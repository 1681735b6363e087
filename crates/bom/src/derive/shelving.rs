//! Light- and heavy-duty shelving.

use rackquote_catalog::Catalog;
use rackquote_catalog::axis::Axis;
use rackquote_catalog::extras::SHORT_POST_HEIGHT;
use rackquote_core::RackFamily;

use super::{DeriveContext, FamilyStrategy, template_lines};
use crate::line::BomLine;
use crate::naming;
use crate::specification::{depth_spec, width_spec};

/// Levels assumed for a short-post rack whose level token carries no number.
const SHORT_POST_DEFAULT_LEVELS: u64 = 5;

pub struct ShelvingStrategy {
    family: RackFamily,
}

impl ShelvingStrategy {
    pub const fn new(family: RackFamily) -> Self {
        Self { family }
    }

    fn is_short_post(&self, ctx: &DeriveContext<'_>) -> bool {
        self.family == RackFamily::LightDuty && ctx.height_token == SHORT_POST_HEIGHT
    }

    fn short_post_lines(&self, ctx: &DeriveContext<'_>) -> Vec<BomLine> {
        let levels = ctx.levels.unwrap_or(SHORT_POST_DEFAULT_LEVELS);
        let width = ctx.width();
        let depth = ctx.depth();
        vec![
            ctx.post_line(ctx.by_form(4, 2)),
            ctx.computed(naming::cross_bar(&width), width_spec(&width), 4),
            ctx.shelf_line(levels),
            ctx.computed(naming::top_pad(&depth), depth_spec(&depth), 2),
            ctx.computed(naming::bottom_pad(&depth), depth_spec(&depth), 2),
            ctx.computed(
                naming::safety_seat(self.family),
                self.family.label().to_string(),
                ctx.by_form(4, 2),
            ),
            ctx.computed(naming::safety_pin(self.family), self.family.label().to_string(), 8),
        ]
    }
}

impl FamilyStrategy for ShelvingStrategy {
    fn required_axes(&self) -> &'static [Axis] {
        &[Axis::Size, Axis::Height, Axis::Level, Axis::FormType]
    }

    fn catalog_lines(&self, catalog: &Catalog, ctx: &DeriveContext<'_>) -> Option<Vec<BomLine>> {
        let path = [ctx.size_token, ctx.height_token, ctx.level_token, ctx.form.token()];
        template_lines(catalog, ctx, path)
    }

    /// Only the short-post variant has a formula; other heights are sold
    /// from catalog templates alone.
    fn fallback_lines(&self, ctx: &DeriveContext<'_>) -> Vec<BomLine> {
        if self.is_short_post(ctx) {
            self.short_post_lines(ctx)
        } else {
            tracing::debug!(family = %self.family, height = ctx.height_token, "no template and no formula");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_bom;
    use rackquote_catalog::axis::Selection;

    fn short_post(form: &str, level: &str) -> Selection {
        Selection::default()
            .with(Axis::Size, "900x450")
            .with(Axis::Height, SHORT_POST_HEIGHT)
            .with(Axis::Level, level)
            .with(Axis::FormType, form)
    }

    fn qty(lines: &[BomLine], name: &str) -> u64 {
        lines.iter().filter(|l| l.name == name).map(|l| l.quantity).sum()
    }

    #[test]
    fn short_post_connected_formula() {
        let lines = derive_bom(
            &Catalog::default(),
            RackFamily::LightDuty,
            &short_post("connected", "L3"),
            2,
            &[],
            &[],
        );
        assert_eq!(qty(&lines, "Post(H750)"), 4);
        assert_eq!(qty(&lines, "Cross Bar(900)"), 8);
        assert_eq!(qty(&lines, "Shelf(900)"), 6);
        assert_eq!(qty(&lines, "Top Pad(450)"), 4);
        assert_eq!(qty(&lines, "Bottom Pad(450)"), 4);
        assert_eq!(qty(&lines, "Safety Seat(Light-duty)"), 4);
        assert_eq!(qty(&lines, "Safety Pin(Light-duty)"), 16);

        let pad = lines.iter().find(|l| l.name == "Top Pad(450)").unwrap();
        assert_eq!(pad.specification, "D450");
    }

    #[test]
    fn short_post_defaults_to_five_levels() {
        let lines = derive_bom(
            &Catalog::default(),
            RackFamily::LightDuty,
            &short_post("standalone", "top"),
            1,
            &[],
            &[],
        );
        assert_eq!(qty(&lines, "Shelf(900)"), 5);
        assert_eq!(qty(&lines, "Post(H750)"), 4);
    }

    #[test]
    fn heavy_duty_has_no_short_post_formula() {
        let lines = derive_bom(
            &Catalog::default(),
            RackFamily::HeavyDuty,
            &short_post("standalone", "L3"),
            1,
            &[],
            &[],
        );
        assert!(lines.is_empty());
    }
}
