//! Catalog data and option resolution.
//!
//! The catalog (price table, BOM templates, accessories) is loaded once per
//! session by an external collaborator and never mutated. This crate models it
//! and answers "which values are valid next?" for a partial selection.

pub mod axis;
pub mod collate;
pub mod extras;
pub mod model;
pub mod options;

pub use axis::{Axis, FormType, Selection, Size};
pub use collate::{CollationKey, collate};
pub use model::{
    Accessory, AccessoryTable, BomTemplates, Catalog, CatalogComponent, CatalogEntry, CatalogError,
    PriceNode, PriceTable,
};
pub use options::{AvailableOptions, AxisChange, SelectionState, reduce, resolve_options};
