//! Value object trait: equality by value, not identity.

/// Marker trait for immutable values compared by their attributes.
///
/// A severity band computed from `(quantity, threshold)` is a value object:
/// it has no lifecycle of its own and two equal bands are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
