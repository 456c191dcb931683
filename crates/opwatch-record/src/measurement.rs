//! The introspection capability measurement types supply.

use crate::value::FieldValue;

/// A structured measurement that can be converted into a generic record.
///
/// Implementors describe themselves: a stable wire/type name and the set
/// of named, typed, non-repeated fields. Conversion is implemented once,
/// generically, against this capability (see [`crate::to_record`]) — a
/// new measurement type needs no conversion code of its own.
///
/// Fields reported as [`FieldValue::Repeated`] or
/// [`FieldValue::Unsupported`] are skipped during conversion; reporting
/// them is optional but keeps the descriptor honest about what the type
/// carries.
pub trait Measurement {
    /// Wire/type name of the measurement (e.g. `"queue.QueueInfo"`).
    fn type_name(&self) -> &str;

    /// Named scalar fields in declaration order.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;
}
