//! `rackquote-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every engine crate
//! (no infrastructure concerns): the rack family tag, part identifiers, amount
//! coercion, strongly-typed ids and the domain error model.

pub mod amount;
pub mod entity;
pub mod error;
pub mod family;
pub mod id;
pub mod part;
pub mod revision;
pub mod value_object;

pub use amount::{Amount, Quantity};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use family::RackFamily;
pub use id::CartEntryId;
pub use part::{PartId, normalize_segment};
pub use revision::ExpectedVersion;
pub use value_object::ValueObject;
