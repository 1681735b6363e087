//! Option resolution and the cascading selection reducer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rackquote_core::RackFamily;

use crate::axis::{Axis, FormType, Selection, sort_numeric, sort_sizes, weight_only};
use crate::collate::collate;
use crate::extras::{
    COMMON_LEVELS, FULL_LEVELS, HEAVY_EXTRA_SIZE, HIGH_RACK_HEIGHTS, NARROW_HIGH_RACK_SIZE,
    NARROW_SIZE_HIDDEN_FOR, SHORT_POST_CATALOG_HEIGHT, SHORT_POST_HEIGHT, data_size_from_view,
    extra_options, is_heavy_weight_class, view_size_from_data,
};
use crate::model::Catalog;

/// Per-axis candidate lists, each already sorted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailableOptions(BTreeMap<Axis, Vec<String>>);

impl AvailableOptions {
    pub fn get(&self, axis: Axis) -> &[String] {
        self.0.get(&axis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the axis is offered at this point of the cascade.
    pub fn offers(&self, axis: Axis) -> bool {
        self.0.contains_key(&axis)
    }

    pub fn contains(&self, axis: Axis, value: &str) -> bool {
        self.get(axis).iter().any(|v| v == value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn axes(&self) -> impl Iterator<Item = Axis> + '_ {
        self.0.keys().copied()
    }

    fn put(&mut self, axis: Axis, values: Vec<String>) {
        self.0.insert(axis, values);
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Standalone first, then connected, then anything else the catalog carries.
fn sort_form_types(values: Vec<String>) -> Vec<String> {
    let mut out = values;
    out.sort_by(|a, b| {
        let rank = |v: &str| FormType::from_token(v).map(|f| f as u8).unwrap_or(u8::MAX);
        rank(a).cmp(&rank(b)).then_with(|| collate(a, b))
    });
    out.dedup();
    out
}

/// Candidate values for every axis reachable from `selection`.
///
/// No family selected yields an empty map; axes below the first unset one
/// are omitted.
pub fn resolve_options(
    catalog: &Catalog,
    family: Option<RackFamily>,
    selection: &Selection,
) -> AvailableOptions {
    let Some(family) = family else {
        return AvailableOptions::default();
    };
    match family {
        RackFamily::HighRack => high_rack_options(catalog, selection),
        RackFamily::Stainless => stainless_options(catalog, selection),
        _ => form_family_options(catalog, family, selection),
    }
}

/// Template height that scopes levels and form types for `height`.
pub fn catalog_height(family: RackFamily, height: &str) -> &str {
    if family == RackFamily::LightDuty && height == SHORT_POST_HEIGHT {
        SHORT_POST_CATALOG_HEIGHT
    } else {
        height
    }
}

fn form_family_options(catalog: &Catalog, family: RackFamily, selection: &Selection) -> AvailableOptions {
    let extras = extra_options(family);
    let templates = &catalog.templates;
    let mut options = AvailableOptions::default();

    let sizes = templates
        .sizes(family)
        .into_iter()
        .chain(owned(extras.sizes));
    options.put(Axis::Size, sort_sizes(sizes));

    let size = selection.get(Axis::Size);
    let heights = match size {
        Some(size) => templates.heights(family, size),
        None => Vec::new(),
    };
    options.put(
        Axis::Height,
        sort_numeric(heights.into_iter().chain(owned(extras.heights))),
    );

    let (Some(size), Some(height)) = (size, selection.get(Axis::Height)) else {
        return options;
    };
    let height = catalog_height(family, height);
    let mut levels = templates.levels(family, size, height);
    if levels.is_empty() {
        levels = owned(&FULL_LEVELS);
    }
    options.put(Axis::Level, sort_numeric(levels));

    let Some(level) = selection.get(Axis::Level) else {
        return options;
    };
    let mut forms = templates.form_types(family, size, height, level);
    if forms.is_empty() {
        forms = FormType::ALL.iter().map(|f| f.token().to_string()).collect();
    }
    options.put(Axis::FormType, sort_form_types(forms));
    options
}

fn hides_narrow_size(weight: &str) -> bool {
    weight_only(weight).is_some_and(|w| NARROW_SIZE_HIDDEN_FOR.contains(&w.as_str()))
}

/// Catalogued size token for a displayed high-rack size.
pub fn high_rack_data_size<'a>(weight: &str, view_size: &'a str) -> &'a str {
    if is_heavy_weight_class(weight) {
        data_size_from_view(view_size)
    } else {
        view_size
    }
}

fn high_rack_options(catalog: &Catalog, selection: &Selection) -> AvailableOptions {
    let family = RackFamily::HighRack;
    let extras = extra_options(family);
    let prices = &catalog.prices;
    let mut options = AvailableOptions::default();

    options.put(Axis::WeightClass, sort_numeric(prices.keys(family, &[])));
    options.put(
        Axis::FormType,
        FormType::ALL.iter().map(|f| f.token().to_string()).collect(),
    );

    let Some(weight) = selection.get(Axis::WeightClass) else {
        return options;
    };
    let heavy = is_heavy_weight_class(weight);
    let mut sizes: Vec<String> = prices
        .keys(family, &[weight])
        .into_iter()
        .map(|s| if heavy { view_size_from_data(&s).to_string() } else { s })
        .collect();
    sizes.extend(owned(extras.sizes));
    if heavy {
        sizes.push(HEAVY_EXTRA_SIZE.to_string());
    }
    if hides_narrow_size(weight) {
        sizes.retain(|s| s != NARROW_HIGH_RACK_SIZE);
    }
    options.put(Axis::Size, sort_sizes(sizes));

    let Some(size) = selection.get(Axis::Size) else {
        return options;
    };
    options.put(Axis::Height, owned(&HIGH_RACK_HEIGHTS));

    let Some(height) = selection.get(Axis::Height) else {
        return options;
    };
    let data_size = high_rack_data_size(weight, size);
    let mut levels = prices.keys(family, &[weight, data_size, height]);
    if levels.is_empty() {
        levels = owned(&FULL_LEVELS);
    }
    levels.extend(owned(extras.levels));
    if heavy {
        levels.extend(owned(&FULL_LEVELS));
    }
    options.put(Axis::Level, sort_numeric(levels));
    options
}

fn stainless_options(catalog: &Catalog, selection: &Selection) -> AvailableOptions {
    let family = RackFamily::Stainless;
    let extras = extra_options(family);
    let prices = &catalog.prices;
    let mut options = AvailableOptions::default();

    options.put(Axis::Size, sort_sizes(prices.keys(family, &[])));

    let Some(size) = selection.get(Axis::Size) else {
        return options;
    };
    let heights = prices.keys(family, &[size]).into_iter().chain(owned(extras.heights));
    options.put(Axis::Height, sort_numeric(heights));

    let Some(height) = selection.get(Axis::Height) else {
        return options;
    };
    let levels = prices
        .keys(family, &[size, height])
        .into_iter()
        .chain(owned(extras.levels))
        .chain(owned(&COMMON_LEVELS));
    options.put(Axis::Level, sort_numeric(levels));
    options
}

/// One user edit to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisChange {
    Family(Option<RackFamily>),
    Set(Axis, Option<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub family: Option<RackFamily>,
    pub selection: Selection,
}

impl SelectionState {
    pub fn new(family: RackFamily) -> Self {
        Self {
            family: Some(family),
            selection: Selection::default(),
        }
    }
}

fn clear_from(selection: &mut Selection, axis: Axis) {
    selection.set(axis, None);
    for below in axis.downstream() {
        selection.set(below, None);
    }
}

/// Apply `change` and drop every downstream value it invalidated.
pub fn reduce(catalog: &Catalog, state: &SelectionState, change: AxisChange) -> SelectionState {
    match change {
        AxisChange::Family(family) => SelectionState {
            family,
            selection: Selection::default(),
        },
        AxisChange::Set(axis, value) => {
            let mut selection = state.selection.clone();
            match value.filter(|v| !v.trim().is_empty()) {
                None => clear_from(&mut selection, axis),
                Some(value) => {
                    selection.set(axis, Some(value));
                    for below in axis.downstream() {
                        let Some(current) = selection.get(below).map(str::to_string) else {
                            continue;
                        };
                        let options = resolve_options(catalog, state.family, &selection);
                        if !options.contains(below, &current) {
                            tracing::debug!(axis = ?below, value = %current, "clearing stale selection");
                            clear_from(&mut selection, below);
                            break;
                        }
                    }
                }
            }
            SelectionState {
                family: state.family,
                selection,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogComponent, CatalogEntry};

    fn entry(total: u64) -> CatalogEntry {
        CatalogEntry {
            total_price: total,
            components: vec![CatalogComponent {
                name: "Post".into(),
                specification: String::new(),
                quantity: 4,
                unit_price: total / 4,
                total_price: 0,
                note: String::new(),
            }],
        }
    }

    fn catalog() -> Catalog {
        let mut c = Catalog::default();
        c.templates.insert(RackFamily::Pallet, ["2080x1000", "H3000", "L3", "standalone"], entry(400));
        c.templates.insert(RackFamily::Pallet, ["2080x1000", "H3000", "L3", "connected"], entry(300));
        c.templates.insert(RackFamily::Pallet, ["1380x800", "H2000", "L2", "standalone"], entry(200));
        c.templates.insert(RackFamily::LightDuty, ["900x450", "H900", "L4", "connected"], entry(100));

        c.prices.insert(RackFamily::HighRack, &["270kg", "60x90", "150", "L3"], 1000);
        c.prices.insert(RackFamily::HighRack, &["270kg", "45x150", "150", "L3"], 1000);
        c.prices.insert(RackFamily::HighRack, &["550kg", "80x146", "200", "L2"], 2000);
        c.prices.insert(RackFamily::HighRack, &["550kg", "45x150", "200", "L2"], 2000);
        c.prices.insert(RackFamily::Stainless, &["45x90", "150", "L4"], 500);
        c
    }

    fn strings(values: &[&str]) -> Vec<String> {
        owned(values)
    }

    #[test]
    fn no_family_yields_empty_map() {
        assert!(resolve_options(&catalog(), None, &Selection::default()).is_empty());
    }

    #[test]
    fn pallet_sizes_merge_catalog_and_extras() {
        let opts = resolve_options(&catalog(), Some(RackFamily::Pallet), &Selection::default());
        assert_eq!(opts.get(Axis::Size), strings(&["1380x800", "2080x1000"]));
        assert_eq!(opts.get(Axis::Height), strings(&["H4500", "H5000", "H5500", "H6000"]));
        assert!(!opts.offers(Axis::Level));
    }

    #[test]
    fn pallet_heights_scope_to_size_and_levels_default() {
        let sel = Selection::default().with(Axis::Size, "2080x1000");
        let opts = resolve_options(&catalog(), Some(RackFamily::Pallet), &sel);
        assert_eq!(
            opts.get(Axis::Height),
            strings(&["H3000", "H4500", "H5000", "H5500", "H6000"])
        );

        let sel = sel.with(Axis::Height, "H4500");
        let opts = resolve_options(&catalog(), Some(RackFamily::Pallet), &sel);
        assert_eq!(opts.get(Axis::Level), strings(&FULL_LEVELS));

        let sel = sel.with(Axis::Level, "L4");
        let opts = resolve_options(&catalog(), Some(RackFamily::Pallet), &sel);
        assert_eq!(opts.get(Axis::FormType), strings(&["standalone", "connected"]));
    }

    #[test]
    fn short_post_reads_the_h900_branch() {
        let sel = Selection::default()
            .with(Axis::Size, "900x450")
            .with(Axis::Height, "H750")
            .with(Axis::Level, "L4");
        let opts = resolve_options(&catalog(), Some(RackFamily::LightDuty), &sel);
        assert_eq!(opts.get(Axis::Level), strings(&["L4"]));
        assert_eq!(opts.get(Axis::FormType), strings(&["connected"]));
    }

    #[test]
    fn high_rack_aliases_heavy_sizes_and_hides_narrow() {
        let sel = Selection::default().with(Axis::WeightClass, "550kg");
        let opts = resolve_options(&catalog(), Some(RackFamily::HighRack), &sel);
        assert_eq!(opts.get(Axis::Size), strings(&["80x108", "80x200"]));

        let sel = Selection::default().with(Axis::WeightClass, "270kg");
        let opts = resolve_options(&catalog(), Some(RackFamily::HighRack), &sel);
        assert_eq!(opts.get(Axis::Size), strings(&["45x150", "60x90"]));
        assert_eq!(opts.get(Axis::FormType), strings(&["standalone", "connected"]));
    }

    #[test]
    fn high_rack_levels_read_through_the_alias() {
        let sel = Selection::default()
            .with(Axis::WeightClass, "550kg")
            .with(Axis::Size, "80x108")
            .with(Axis::Height, "200");
        let opts = resolve_options(&catalog(), Some(RackFamily::HighRack), &sel);
        assert_eq!(opts.get(Axis::Height), strings(&HIGH_RACK_HEIGHTS));
        assert_eq!(opts.get(Axis::Level), strings(&FULL_LEVELS));
        assert_eq!(high_rack_data_size("550kg", "80x108"), "80x146");
        assert_eq!(high_rack_data_size("270kg", "80x108"), "80x108");
    }

    #[test]
    fn stainless_levels_include_common_range() {
        let sel = Selection::default().with(Axis::Size, "45x90").with(Axis::Height, "150");
        let opts = resolve_options(&catalog(), Some(RackFamily::Stainless), &sel);
        assert_eq!(opts.get(Axis::Height), strings(&["150", "210"]));
        assert_eq!(opts.get(Axis::Level), strings(&["L2", "L3", "L4", "L5", "L6"]));
    }

    #[test]
    fn family_change_clears_everything() {
        let state = SelectionState {
            family: Some(RackFamily::Pallet),
            selection: Selection::default().with(Axis::Size, "2080x1000"),
        };
        let next = reduce(&catalog(), &state, AxisChange::Family(Some(RackFamily::Stainless)));
        assert_eq!(next.family, Some(RackFamily::Stainless));
        assert_eq!(next.selection, Selection::default());
    }

    #[test]
    fn upstream_change_clears_stale_downstream() {
        let c = catalog();
        let state = SelectionState {
            family: Some(RackFamily::Pallet),
            selection: Selection::default()
                .with(Axis::Size, "2080x1000")
                .with(Axis::Height, "H3000")
                .with(Axis::Level, "L3")
                .with(Axis::FormType, "connected"),
        };

        let next = reduce(&c, &state, AxisChange::Set(Axis::Size, Some("1380x800".into())));
        assert_eq!(next.selection.get(Axis::Size), Some("1380x800"));
        assert_eq!(next.selection.get(Axis::Height), None);
        assert_eq!(next.selection.get(Axis::Level), None);
        assert_eq!(next.selection.get(Axis::FormType), None);
    }

    #[test]
    fn still_valid_downstream_values_survive() {
        let c = catalog();
        let state = SelectionState {
            family: Some(RackFamily::Pallet),
            selection: Selection::default()
                .with(Axis::Size, "2080x1000")
                .with(Axis::Height, "H4500")
                .with(Axis::Level, "L5"),
        };

        let next = reduce(&c, &state, AxisChange::Set(Axis::Size, Some("1380x800".into())));
        assert_eq!(next.selection.get(Axis::Height), Some("H4500"));
        assert_eq!(next.selection.get(Axis::Level), Some("L5"));
    }

    #[test]
    fn clearing_an_axis_clears_below_it() {
        let state = SelectionState {
            family: Some(RackFamily::Stainless),
            selection: Selection::default()
                .with(Axis::Size, "45x90")
                .with(Axis::Height, "150")
                .with(Axis::Level, "L4"),
        };
        let next = reduce(&catalog(), &state, AxisChange::Set(Axis::Height, None));
        assert_eq!(next.selection.get(Axis::Size), Some("45x90"));
        assert_eq!(next.selection.get(Axis::Height), None);
        assert_eq!(next.selection.get(Axis::Level), None);
    }

    #[test]
    fn weight_change_drops_hidden_size() {
        let state = SelectionState {
            family: Some(RackFamily::HighRack),
            selection: Selection::default()
                .with(Axis::WeightClass, "270kg")
                .with(Axis::Size, "45x150")
                .with(Axis::Height, "150"),
        };
        let next = reduce(&catalog(), &state, AxisChange::Set(Axis::WeightClass, Some("550kg".into())));
        assert_eq!(next.selection.get(Axis::Size), None);
        assert_eq!(next.selection.get(Axis::Height), None);
    }
}
