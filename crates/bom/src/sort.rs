//! Deterministic display order for material lists.

use core::cmp::Ordering;

use rackquote_catalog::CollationKey;
use rackquote_core::amount::first_integer;

use crate::line::BomLine;
use crate::naming::canonical_name;

/// Display category: a key plus alternate spellings matched by substring.
#[derive(Debug, Copy, Clone)]
pub struct Category {
    pub key: &'static str,
    pub aliases: &'static [&'static str],
}

const WILDCARD: &str = "*";

/// Categories in display order. Unmatched names fall into the wildcard.
pub const CATEGORIES: [Category; 15] = [
    Category { key: "post", aliases: &["upright"] },
    Category { key: "load beam", aliases: &[] },
    Category { key: "tie beam", aliases: &[] },
    Category { key: "cross bar", aliases: &[] },
    Category { key: "shelf", aliases: &["deck", "panel"] },
    Category { key: "top pad", aliases: &[] },
    Category { key: "bottom pad", aliases: &[] },
    Category { key: "safety seat", aliases: &[] },
    Category { key: "safety pin", aliases: &[] },
    Category { key: "horizontal brace", aliases: &["horizontal bracing"] },
    Category { key: "diagonal brace", aliases: &["diagonal bracing"] },
    Category { key: "anchor bolt", aliases: &[] },
    Category { key: "bracing bolt", aliases: &[] },
    Category { key: "bracing rubber", aliases: &["bushing"] },
    Category { key: WILDCARD, aliases: &[] },
];

pub fn category_index(name: &str) -> usize {
    let lowered = canonical_name(name).to_lowercase();
    let matches = |c: &Category| {
        c.key != WILDCARD
            && (lowered.contains(c.key) || c.aliases.iter().any(|a| lowered.contains(a)))
    };
    CATEGORIES
        .iter()
        .position(matches)
        .or_else(|| CATEGORIES.iter().position(|c| c.key == WILDCARD))
        .unwrap_or(CATEGORIES.len())
}

/// Embedded-number rank: numbered names first, by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum NumberRank {
    Numbered(u64),
    Unnumbered,
}

/// Precomputed position of a line in display order.
///
/// Family label, category, embedded number, collated name, specification,
/// quantity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialSortKey {
    family: CollationKey,
    category: usize,
    number: NumberRank,
    name: CollationKey,
    specification: CollationKey,
    quantity: u64,
}

impl MaterialSortKey {
    pub fn of(line: &BomLine) -> Self {
        let name = canonical_name(&line.name);
        Self {
            family: CollationKey::new(line.family.label()),
            category: category_index(&name),
            number: first_integer(&name).map_or(NumberRank::Unnumbered, NumberRank::Numbered),
            name: CollationKey::new(&name),
            specification: CollationKey::new(&line.specification),
            quantity: line.quantity,
        }
    }
}

/// Total order over BOM lines.
pub fn compare_materials(a: &BomLine, b: &BomLine) -> Ordering {
    MaterialSortKey::of(a).cmp(&MaterialSortKey::of(b))
}

/// Canonicalize names and sort in place (stable).
pub fn sort_materials(lines: &mut [BomLine]) {
    for line in lines.iter_mut() {
        line.name = canonical_name(&line.name);
    }
    lines.sort_by_cached_key(MaterialSortKey::of);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rackquote_core::RackFamily;

    fn line(family: RackFamily, name: &str, spec: &str, qty: u64) -> BomLine {
        BomLine::computed(family, name, spec, qty)
    }

    fn names(lines: &[BomLine]) -> Vec<&str> {
        lines.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn categories_then_numbers_then_names() {
        let mut lines = vec![
            line(RackFamily::Pallet, "Bracing Bolt", "", 10),
            line(RackFamily::Pallet, "Load Beam(2580)", "2580", 8),
            line(RackFamily::Pallet, "Post(H4500)", "Height H4500", 4),
            line(RackFamily::Pallet, "Load Beam(1380)", "1380", 8),
            line(RackFamily::Pallet, "Casters", "", 4),
            line(RackFamily::Pallet, "Diagonal Bracing", "1000", 16),
        ];
        sort_materials(&mut lines);
        assert_eq!(
            names(&lines),
            vec![
                "Post(H4500)",
                "Load Beam(1380)",
                "Load Beam(2580)",
                "Diagonal Brace",
                "Bracing Bolt",
                "Casters",
            ]
        );
    }

    #[test]
    fn families_group_by_label() {
        let mut lines = vec![
            line(RackFamily::Stainless, "Post(150)", "Height 150", 4),
            line(RackFamily::HighRack, "Post(200)", "Height 200", 4),
            line(RackFamily::HeavyDuty, "Shelf(900)", "Size 900x600", 4),
        ];
        sort_materials(&mut lines);
        let families: Vec<_> = lines.iter().map(|l| l.family).collect();
        assert_eq!(
            families,
            vec![RackFamily::HeavyDuty, RackFamily::HighRack, RackFamily::Stainless]
        );
    }

    #[test]
    fn numbered_names_precede_unnumbered_ones_in_a_category() {
        let hook = line(RackFamily::LightDuty, "Hook 2", "", 1);
        let label = line(RackFamily::LightDuty, "Label", "", 1);
        let mat = line(RackFamily::LightDuty, "Mat 1", "", 1);

        let mut forward = vec![hook.clone(), label.clone(), mat.clone()];
        let mut backward = vec![mat, label, hook];
        sort_materials(&mut forward);
        sort_materials(&mut backward);

        assert_eq!(names(&forward), vec!["Mat 1", "Hook 2", "Label"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn wildcard_index_for_unknown_parts() {
        assert_eq!(category_index("Casters"), CATEGORIES.len() - 1);
        assert_eq!(category_index("Upright(H3000)"), 0);
        assert_eq!(category_index("Rubber Bushing"), 13);
    }

    fn arb_line() -> impl Strategy<Value = BomLine> {
        let families = prop::sample::select(RackFamily::ALL.to_vec());
        let names = prop::sample::select(vec![
            "Post(H3000)",
            "Post(H900)",
            "Load Beam(2080)",
            "Shelf(45)",
            "Anchor Bolt",
            "Casters",
            "Diagonal Bracing",
            "Safety Pin(pallet)",
            "Hook 2",
            "Hook 10",
            "Label",
            "Mat 1",
            "casters",
        ]);
        let specs = prop::sample::select(vec!["", "2080", "Size 900x450", "Height H3000"]);
        (families, names, specs, 0u64..50)
            .prop_map(|(family, name, spec, qty)| BomLine::computed(family, name, spec, qty))
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig { cases: 500, .. ProptestConfig::default() })]

            #[test]
            fn sorting_twice_is_a_no_op(mut lines in prop::collection::vec(arb_line(), 0..60)) {
                sort_materials(&mut lines);
                let once = lines.clone();
                sort_materials(&mut lines);
                prop_assert_eq!(once, lines);
            }

            #[test]
            fn order_is_independent_of_input_permutation(
                lines in prop::collection::vec(arb_line(), 0..40),
                seed in any::<u64>(),
            ) {
                let mut forward = lines.clone();
                let mut shuffled = lines;
                let len = shuffled.len().max(1);
                shuffled.rotate_left((seed as usize) % len);
                shuffled.reverse();

                sort_materials(&mut forward);
                sort_materials(&mut shuffled);
                prop_assert_eq!(forward, shuffled);
            }

            #[test]
            fn comparator_is_antisymmetric(a in arb_line(), b in arb_line()) {
                prop_assert_eq!(compare_materials(&a, &b), compare_materials(&b, &a).reverse());
            }

            #[test]
            fn comparator_is_transitive(a in arb_line(), b in arb_line(), c in arb_line()) {
                if compare_materials(&a, &b).is_le() && compare_materials(&b, &c).is_le() {
                    prop_assert!(compare_materials(&a, &c).is_le());
                }
            }
        }
    }
}
