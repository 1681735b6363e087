//! Bill-of-materials derivation, ordering and consolidation.
//!
//! Pure domain logic: the deriver turns a completed selection into unpriced
//! [`BomLine`]s, the sorter fixes their display order and the aggregator merges
//! them across the items of a [`Cart`].

pub mod aggregate;
pub mod cart;
pub mod derive;
pub mod line;
pub mod naming;
pub mod sort;
pub mod specification;

pub use aggregate::{AggregatedBom, MergeKey, aggregate, aggregate_lines};
pub use cart::{Cart, CartEntry};
pub use derive::{CustomLine, DeriveContext, FamilyStrategy, derive_bom, strategy_for};
pub use line::{BomLine, LineOrigin, total_of};
pub use naming::{PartKind, canonical_name};
pub use sort::{MaterialSortKey, compare_materials, sort_materials};
pub use specification::complete_specification;
