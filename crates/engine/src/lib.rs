//! `rackquote-engine`: the quoting facade.
//!
//! Wires the catalog, BOM derivation, price resolution and the cart together
//! behind [`QuoteEngine`]. Storage and transport are injected: any
//! [`rackquote_pricing::OverrideRepository`] and any
//! [`rackquote_events::EventBus`] carrying [`rackquote_events::PriceEvent`]s.

pub mod engine;
pub mod quote;

pub use engine::{CartTotals, EngineSettings, QuoteEngine};
pub use quote::QuoteRequest;
