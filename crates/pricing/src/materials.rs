//! Every distinct part the catalog can quote.
//!
//! Built once from the loaded [`Catalog`]: template components for every
//! configuration plus the procedurally generated high-rack and stainless parts
//! for every price-table combination. Serves as the last price source before 0
//! and as the administrator's searchable part list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use rackquote_bom::derive_bom;
use rackquote_catalog::axis::{Axis, FormType, Selection};
use rackquote_catalog::extras::view_size_from_data;
use rackquote_catalog::{Catalog, PriceTable};
use rackquote_core::{Amount, PartId, RackFamily};

/// One quotable part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub part_id: PartId,
    pub family: RackFamily,
    pub name: String,
    pub specification: String,
    /// Catalog unit price; 0 for parts only produced by formulas.
    pub unit_price: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCatalog {
    materials: BTreeMap<PartId, Material>,
}

impl MaterialCatalog {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut out = Self::default();

        for (family, [size, height, level, form], _) in catalog.templates.iter() {
            if family == RackFamily::HighRack {
                // Keyed by data size without a weight class; covered below.
                continue;
            }
            let selection = Selection::default()
                .with(Axis::Size, size)
                .with(Axis::Height, height)
                .with(Axis::Level, level)
                .with(Axis::FormType, form);
            out.absorb(catalog, family, &selection);
        }

        for [weight, data_size, height, level] in leaf_paths::<4>(&catalog.prices, RackFamily::HighRack) {
            for form in FormType::ALL {
                let selection = Selection::default()
                    .with(Axis::WeightClass, &weight)
                    .with(Axis::Size, view_size_from_data(&data_size))
                    .with(Axis::Height, &height)
                    .with(Axis::Level, &level)
                    .with(Axis::FormType, form.token());
                out.absorb(catalog, RackFamily::HighRack, &selection);
            }
        }

        for [size, height, level] in leaf_paths::<3>(&catalog.prices, RackFamily::Stainless) {
            let selection = Selection::default()
                .with(Axis::Size, &size)
                .with(Axis::Height, &height)
                .with(Axis::Level, &level);
            out.absorb(catalog, RackFamily::Stainless, &selection);
        }

        debug!(materials = out.len(), "material catalog built");
        out
    }

    fn absorb(&mut self, catalog: &Catalog, family: RackFamily, selection: &Selection) {
        for line in derive_bom(catalog, family, selection, 1, &[], &[]) {
            let part_id = line.part_id();
            match self.materials.get_mut(&part_id) {
                Some(existing) => {
                    if existing.unit_price == 0 {
                        existing.unit_price = line.unit_price;
                    }
                }
                None => {
                    self.materials.insert(
                        part_id.clone(),
                        Material {
                            part_id,
                            family: line.family,
                            name: line.name,
                            specification: line.specification,
                            unit_price: line.unit_price,
                        },
                    );
                }
            }
        }
    }

    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.part_id.clone(), material);
    }

    pub fn get(&self, part_id: &PartId) -> Option<&Material> {
        self.materials.get(part_id)
    }

    /// Positive catalog price for the part, if any.
    pub fn price(&self, part_id: &PartId) -> Option<Amount> {
        self.get(part_id).map(|m| m.unit_price).filter(|p| *p > 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Case-insensitive match on key, name and specification.
    pub fn search(&self, term: &str, family: Option<RackFamily>) -> Vec<&Material> {
        let needle = term.trim().to_lowercase();
        self.iter()
            .filter(|m| family.is_none_or(|f| m.family == f))
            .filter(|m| {
                needle.is_empty()
                    || m.part_id.as_str().to_lowercase().contains(&needle)
                    || m.name.to_lowercase().contains(&needle)
                    || m.specification.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// All key paths of exactly `N` segments under `family`.
fn leaf_paths<const N: usize>(prices: &PriceTable, family: RackFamily) -> Vec<[String; N]> {
    fn walk<const N: usize>(
        prices: &PriceTable,
        family: RackFamily,
        prefix: &mut Vec<String>,
        out: &mut Vec<[String; N]>,
    ) {
        if prefix.len() == N {
            if let Ok(path) = <[String; N]>::try_from(prefix.clone()) {
                out.push(path);
            }
            return;
        }
        let path: Vec<&str> = prefix.iter().map(String::as_str).collect();
        for key in prices.keys(family, &path) {
            prefix.push(key);
            walk(prices, family, prefix, out);
            prefix.pop();
        }
    }

    let mut out = Vec::new();
    walk(prices, family, &mut Vec::with_capacity(N), &mut out);
    out
}
