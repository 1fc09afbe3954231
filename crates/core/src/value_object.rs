//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values;
/// identity does not matter. `EffectivePrice { base_price: 100, .. }` is a
/// value object, a `Cart` is an entity. To "modify" a value object, build a
/// new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
