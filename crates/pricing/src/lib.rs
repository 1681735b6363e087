//! `rackquote-pricing`: price overrides and unit-price resolution.
//!
//! Overrides live behind [`OverrideRepository`]; [`PriceResolver`] layers them
//! over catalog prices. Subtotal selection, rate application and the
//! administrator statistics sit alongside.

pub mod materials;
pub mod overrides;
pub mod rate;
pub mod repository;
pub mod resolver;
pub mod stats;
pub mod subtotal;

pub use materials::{Material, MaterialCatalog};
pub use overrides::{
    OverrideHistoryEntry, OverrideSnapshot, PartDescriptor, PartRecord, PriceOverride, clamp_history_cap,
};
pub use rate::{apply_rate, validate_rate};
pub use repository::{InMemoryOverrideRepository, OverrideRepository};
pub use resolver::{PriceResolver, PriceSource, ResolvedPrice, ResolverSettings, parse_price};
pub use stats::{OverrideMatch, OverrideStatistics, search_overrides};
pub use subtotal::{SubtotalPolicy, compute_subtotal};
