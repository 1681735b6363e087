//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Part identifiers, selections and BOM lines are compared by their attribute
/// values; two descriptors with the same family, name and specification denote
/// the same physical part.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
