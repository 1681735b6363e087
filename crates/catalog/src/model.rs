//! Immutable catalog data: price table, BOM templates, accessory table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rackquote_core::amount::{coerce_amount, coerce_amount_str, deserialize_lenient};
use rackquote_core::{Amount, Quantity, RackFamily};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed {document} document: {source}")]
    Malformed {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One component row of a BOM template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogComponent {
    pub name: String,
    #[serde(default)]
    pub specification: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub quantity: Quantity,
    #[serde(default, alias = "unitPrice", deserialize_with = "deserialize_lenient")]
    pub unit_price: Amount,
    /// Per-component total for the template quantity; 0 when not declared.
    #[serde(default, alias = "totalPrice", deserialize_with = "deserialize_lenient")]
    pub total_price: Amount,
    #[serde(default)]
    pub note: String,
}

impl CatalogComponent {
    /// Declared total when present, else unit × quantity.
    pub fn line_total(&self) -> Amount {
        if self.total_price > 0 {
            self.total_price
        } else {
            self.unit_price.saturating_mul(self.quantity)
        }
    }
}

/// Record at one full axis path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, alias = "totalPrice", deserialize_with = "deserialize_lenient")]
    pub total_price: Amount,
    #[serde(default)]
    pub components: Vec<CatalogComponent>,
}

impl CatalogEntry {
    /// Declared total, else the sum of component totals.
    pub fn usable_total(&self) -> Amount {
        if self.total_price > 0 {
            self.total_price
        } else {
            self.components.iter().map(CatalogComponent::line_total).sum()
        }
    }

    /// A template is usable when it lists parts and carries a non-zero total.
    pub fn is_usable(&self) -> bool {
        !self.components.is_empty() && self.usable_total() > 0
    }
}

type FormTypes = BTreeMap<String, CatalogEntry>;
type Levels = BTreeMap<String, FormTypes>;
type Heights = BTreeMap<String, Levels>;
type Sizes = BTreeMap<String, Heights>;

/// family → size → height → level → form type → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BomTemplates(BTreeMap<RackFamily, Sizes>);

impl BomTemplates {
    pub fn insert(
        &mut self,
        family: RackFamily,
        path: [&str; 4],
        entry: CatalogEntry,
    ) {
        let [size, height, level, form] = path;
        self.0
            .entry(family)
            .or_default()
            .entry(size.to_string())
            .or_default()
            .entry(height.to_string())
            .or_default()
            .entry(level.to_string())
            .or_default()
            .insert(form.to_string(), entry);
    }

    pub fn sizes(&self, family: RackFamily) -> Vec<String> {
        self.0.get(&family).map(|s| s.keys().cloned().collect()).unwrap_or_default()
    }

    pub fn heights(&self, family: RackFamily, size: &str) -> Vec<String> {
        self.heights_map(family, size)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn levels(&self, family: RackFamily, size: &str, height: &str) -> Vec<String> {
        self.levels_map(family, size, height)
            .map(|l| l.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn form_types(&self, family: RackFamily, size: &str, height: &str, level: &str) -> Vec<String> {
        self.levels_map(family, size, height)
            .and_then(|l| l.get(level))
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn entry(&self, family: RackFamily, path: [&str; 4]) -> Option<&CatalogEntry> {
        let [size, height, level, form] = path;
        self.levels_map(family, size, height)?.get(level)?.get(form)
    }

    /// Every (family, path, entry) triple, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (RackFamily, [&str; 4], &CatalogEntry)> {
        self.0.iter().flat_map(|(family, sizes)| {
            sizes.iter().flat_map(move |(size, heights)| {
                heights.iter().flat_map(move |(height, levels)| {
                    levels.iter().flat_map(move |(level, forms)| {
                        forms.iter().map(move |(form, entry)| {
                            (
                                *family,
                                [size.as_str(), height.as_str(), level.as_str(), form.as_str()],
                                entry,
                            )
                        })
                    })
                })
            })
        })
    }

    fn heights_map(&self, family: RackFamily, size: &str) -> Option<&Heights> {
        self.0.get(&family)?.get(size)
    }

    fn levels_map(&self, family: RackFamily, size: &str, height: &str) -> Option<&Levels> {
        self.heights_map(family, size)?.get(height)
    }
}

/// Nested price tree; leaves are list prices.
///
/// Text leaves are read leniently (`"12,000"` → 12000, garbage → 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceNode {
    Price(f64),
    Text(String),
    Branch(BTreeMap<String, PriceNode>),
}

impl PriceNode {
    fn descend(&self, path: &[&str]) -> Option<&PriceNode> {
        path.iter().try_fold(self, |node, key| match node {
            PriceNode::Branch(children) => children.get(*key),
            _ => None,
        })
    }

    fn amount(&self) -> Option<Amount> {
        match self {
            PriceNode::Price(p) => Some(coerce_amount(*p)),
            PriceNode::Text(t) => Some(coerce_amount_str(t)),
            PriceNode::Branch(_) => None,
        }
    }

    fn insert_at(&mut self, path: &[&str], price: Amount) {
        let Some((key, rest)) = path.split_first() else {
            *self = PriceNode::Price(price as f64);
            return;
        };
        if !matches!(self, PriceNode::Branch(_)) {
            *self = PriceNode::Branch(BTreeMap::new());
        }
        if let PriceNode::Branch(children) = self {
            children
                .entry((*key).to_string())
                .or_insert_with(|| PriceNode::Branch(BTreeMap::new()))
                .insert_at(rest, price);
        }
    }
}

/// family → axis path → price. High-rack is keyed by weight class first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(BTreeMap<RackFamily, PriceNode>);

impl PriceTable {
    pub fn insert(&mut self, family: RackFamily, path: &[&str], price: Amount) {
        self.0
            .entry(family)
            .or_insert_with(|| PriceNode::Branch(BTreeMap::new()))
            .insert_at(path, price);
    }

    /// Positive list price at `path`; missing, non-leaf or non-positive → None.
    pub fn price(&self, family: RackFamily, path: &[&str]) -> Option<Amount> {
        self.0
            .get(&family)?
            .descend(path)?
            .amount()
            .filter(|p| *p > 0)
    }

    /// Child keys under `path` (empty at a leaf or a missing path).
    pub fn keys(&self, family: RackFamily, path: &[&str]) -> Vec<String> {
        match self.0.get(&family).and_then(|n| n.descend(path)) {
            Some(PriceNode::Branch(children)) => children.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Optional add-on sold with a rack (extra shelf, casters, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub price: Amount,
    #[serde(default)]
    pub specification: String,
}

/// family → category → accessories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryTable(BTreeMap<RackFamily, BTreeMap<String, Vec<Accessory>>>);

impl AccessoryTable {
    pub fn insert(&mut self, family: RackFamily, category: &str, accessory: Accessory) {
        self.0
            .entry(family)
            .or_default()
            .entry(category.to_string())
            .or_default()
            .push(accessory);
    }

    pub fn categories(&self, family: RackFamily) -> Option<&BTreeMap<String, Vec<Accessory>>> {
        self.0.get(&family)
    }

    pub fn find(&self, family: RackFamily, id: &str) -> Option<&Accessory> {
        self.0
            .get(&family)?
            .values()
            .flatten()
            .find(|a| a.id == id)
    }
}

/// Everything the engine reads from the catalog provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub prices: PriceTable,
    pub templates: BomTemplates,
    pub accessories: AccessoryTable,
}

impl Catalog {
    pub fn new(prices: PriceTable, templates: BomTemplates, accessories: AccessoryTable) -> Self {
        Self {
            prices,
            templates,
            accessories,
        }
    }

    /// Parse the three catalog documents.
    pub fn from_json(prices: &str, templates: &str, accessories: &str) -> Result<Self, CatalogError> {
        let prices = serde_json::from_str(prices).map_err(|source| CatalogError::Malformed {
            document: "price table",
            source,
        })?;
        let templates = serde_json::from_str(templates).map_err(|source| CatalogError::Malformed {
            document: "bom templates",
            source,
        })?;
        let accessories = serde_json::from_str(accessories).map_err(|source| CatalogError::Malformed {
            document: "accessories",
            source,
        })?;
        Ok(Self::new(prices, templates, accessories))
    }
}
