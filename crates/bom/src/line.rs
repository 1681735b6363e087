use serde::{Deserialize, Serialize};

use rackquote_core::{Amount, PartId, Quantity, RackFamily, ValueObject};

/// Where a BOM line came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOrigin {
    /// Mapped from a catalog template component.
    Catalog,
    /// Produced by a per-family quantity formula.
    Computed,
    Accessory,
    /// Free-form line entered by the user (light-duty only).
    Custom,
}

pub const ACCESSORY_NOTE: &str = "accessory";
pub const CUSTOM_NOTE: &str = "custom";

/// One bill-of-materials row.
///
/// `total_price == unit_price × quantity` except for catalog lines whose
/// template declared a per-component total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    pub family: RackFamily,
    pub name: String,
    #[serde(default)]
    pub specification: String,
    pub quantity: Quantity,
    pub unit_price: Amount,
    pub total_price: Amount,
    #[serde(default)]
    pub note: String,
    pub origin: LineOrigin,
    /// Displayed size token of the configuration the line was derived for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub has_override: bool,
}

impl ValueObject for BomLine {}

impl BomLine {
    pub fn new(
        family: RackFamily,
        name: impl Into<String>,
        specification: impl Into<String>,
        quantity: Quantity,
        unit_price: Amount,
        origin: LineOrigin,
    ) -> Self {
        Self {
            family,
            name: name.into(),
            specification: specification.into(),
            quantity,
            unit_price,
            total_price: unit_price.saturating_mul(quantity),
            note: String::new(),
            origin,
            size: None,
            has_override: false,
        }
    }

    /// Computed line with no price yet; the resolver fills it in.
    pub fn computed(
        family: RackFamily,
        name: impl Into<String>,
        specification: impl Into<String>,
        quantity: Quantity,
    ) -> Self {
        Self::new(family, name, specification, quantity, 0, LineOrigin::Computed)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_total(mut self, total_price: Amount) -> Self {
        self.total_price = total_price;
        self
    }

    pub fn part_id(&self) -> PartId {
        PartId::new(self.family, &self.name, &self.specification)
    }

    pub fn recompute_total(&mut self) {
        self.total_price = self.unit_price.saturating_mul(self.quantity);
    }

    pub fn is_custom(&self) -> bool {
        self.origin == LineOrigin::Custom
    }
}

/// Sum of line totals.
pub fn total_of<'a>(lines: impl IntoIterator<Item = &'a BomLine>) -> Amount {
    lines.into_iter().map(|l| l.total_price).sum()
}
