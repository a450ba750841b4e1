//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and self-validating: every constructor checks
/// its input and returns `DomainError::Validation` with a human-readable
/// message, so an existing value is always a valid one. To "modify" a value
/// object, build a new one.
///
/// ```ignore
/// let a = Location::new("Vereda La Palma", "Finca El Roble")?;
/// let b = Location::new("Vereda La Palma", "Finca El Roble")?;
/// assert_eq!(a, b); // equal by value
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
