//! Which figure a quote document shows as its subtotal.

use serde::{Deserialize, Serialize};

use rackquote_core::Amount;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtotalPolicy {
    /// Material sum when there are priced materials, else the item sum.
    #[default]
    MaterialWithItemFallback,
    StrictMaterial,
    ItemOnly,
    /// Item sum plus material sum. Double-counts whenever both are populated.
    #[cfg(feature = "legacy-sum-both")]
    SumBoth,
}

pub fn compute_subtotal(
    item_sum: Amount,
    material_sum: Amount,
    material_count: usize,
    policy: SubtotalPolicy,
) -> Amount {
    match policy {
        SubtotalPolicy::MaterialWithItemFallback => {
            if material_count > 0 && material_sum > 0 {
                material_sum
            } else {
                item_sum
            }
        }
        SubtotalPolicy::StrictMaterial => material_sum,
        SubtotalPolicy::ItemOnly => item_sum,
        #[cfg(feature = "legacy-sum-both")]
        SubtotalPolicy::SumBoth => item_sum.saturating_add(material_sum),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_falls_back_to_items() {
        let policy = SubtotalPolicy::default();
        assert_eq!(compute_subtotal(5000, 0, 0, policy), 5000);
        assert_eq!(compute_subtotal(5000, 4200, 3, policy), 4200);
        assert_eq!(compute_subtotal(5000, 0, 3, policy), 5000);
        assert_eq!(compute_subtotal(0, 0, 0, policy), 0);
    }

    #[test]
    fn fixed_policies_ignore_the_other_side() {
        assert_eq!(compute_subtotal(5000, 0, 0, SubtotalPolicy::StrictMaterial), 0);
        assert_eq!(compute_subtotal(5000, 4200, 3, SubtotalPolicy::ItemOnly), 5000);
    }

    #[test]
    fn policy_parses_from_kebab_case() {
        let policy: SubtotalPolicy = serde_json::from_str("\"strict-material\"").unwrap();
        assert_eq!(policy, SubtotalPolicy::StrictMaterial);
        assert!(serde_json::from_str::<SubtotalPolicy>("\"whatever\"").is_err());
    }

    #[cfg(feature = "legacy-sum-both")]
    #[test]
    fn sum_both_adds_the_two_sums() {
        assert_eq!(compute_subtotal(5000, 4200, 3, SubtotalPolicy::SumBoth), 9200);
    }
}
