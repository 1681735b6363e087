//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Cart entries are the entities of a quote: their BOM snapshot and quantity
/// change, their identity does not.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
