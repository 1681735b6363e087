//! Quoted items and their BOM snapshots.

use serde::{Deserialize, Serialize};

use rackquote_catalog::Selection;
use rackquote_core::amount::rescale;
use rackquote_core::{Amount, CartEntryId, DomainError, DomainResult, Entity, Quantity, RackFamily};

use crate::derive::CustomLine;
use crate::line::BomLine;

/// One quoted item. The BOM is a snapshot taken when the item was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub family: RackFamily,
    pub selection: Selection,
    #[serde(default)]
    pub extra_option_ids: Vec<String>,
    #[serde(default)]
    pub custom_lines: Vec<CustomLine>,
    pub quantity: Quantity,
    pub price: Amount,
    pub bom: Vec<BomLine>,
    /// Quantities and price as they were before the quantity was set to zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parked: Option<Parked>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Parked {
    quantity: Quantity,
    price: Amount,
    /// Per line: quantity and total.
    lines: Vec<(Quantity, Amount)>,
}

impl Entity for CartEntry {
    type Id = CartEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CartEntry {
    pub fn new(
        family: RackFamily,
        selection: Selection,
        quantity: Quantity,
        price: Amount,
        bom: Vec<BomLine>,
    ) -> Self {
        Self {
            id: CartEntryId::new(),
            family,
            selection,
            extra_option_ids: Vec::new(),
            custom_lines: Vec::new(),
            quantity,
            price,
            bom,
            parked: None,
        }
    }

    pub fn with_extras(mut self, extra_option_ids: Vec<String>) -> Self {
        self.extra_option_ids = extra_option_ids;
        self
    }

    pub fn with_custom_lines(mut self, custom_lines: Vec<CustomLine>) -> Self {
        self.custom_lines = custom_lines;
        self
    }

    /// Rescale the BOM snapshot and price from the current quantity to `quantity`.
    ///
    /// Zero keeps the lines with zero quantities; the pre-zero quantities
    /// are kept so a later non-zero quantity scales from them. Unit prices
    /// repriced in between are kept.
    fn rescale_to(&mut self, quantity: Quantity) {
        if self.quantity == 0 {
            if let Some(parked) = self.parked.take() {
                for (line, (qty, total)) in self.bom.iter_mut().zip(parked.lines) {
                    line.quantity = qty;
                    if line.unit_price > 0 {
                        line.recompute_total();
                    } else {
                        line.total_price = total;
                    }
                }
                self.quantity = parked.quantity;
                self.price = parked.price;
            }
        } else if quantity == 0 {
            self.parked = Some(Parked {
                quantity: self.quantity,
                price: self.price,
                lines: self.bom.iter().map(|l| (l.quantity, l.total_price)).collect(),
            });
        }
        let old = self.quantity;
        for line in &mut self.bom {
            line.quantity = rescale(line.quantity, quantity, old);
            if line.unit_price > 0 {
                line.recompute_total();
            } else {
                line.total_price = rescale(line.total_price, quantity, old);
            }
        }
        self.price = rescale(self.price, quantity, old);
        self.quantity = quantity;
    }
}

/// Ordered collection of quoted items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: CartEntry) -> DomainResult<CartEntryId> {
        if entry.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if self.entries.iter().any(|e| e.id == entry.id) {
            return Err(DomainError::conflict(format!("cart entry {} already exists", entry.id)));
        }
        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    pub fn remove(&mut self, id: CartEntryId) -> DomainResult<CartEntry> {
        let at = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(DomainError::not_found)?;
        Ok(self.entries.remove(at))
    }

    /// Change an item's quantity, rescaling its BOM lines and price.
    /// Zero is accepted and zeroes the item.
    pub fn update_quantity(&mut self, id: CartEntryId, quantity: Quantity) -> DomainResult<()> {
        let entry = self.get_mut(id).ok_or_else(DomainError::not_found)?;
        entry.rescale_to(quantity);
        Ok(())
    }

    pub fn get(&self, id: CartEntryId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: CartEntryId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut CartEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of item prices (the item-side subtotal).
    pub fn total(&self) -> Amount {
        self.entries.iter().map(|e| e.price).sum()
    }
}
