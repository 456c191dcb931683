//! Tagged scalar values carried by generic records.

use serde::{Deserialize, Serialize};

/// A single typed payload inside a record's field map.
///
/// Exactly one variant is ever active; the tag travels with the value so
/// a facility can encode it without schema knowledge. Extending the set
/// (new scalar kinds) adds variants without changing the record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GenericValue {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    Bool(bool),
    Text(String),
}

/// A field as reported by [`Measurement::fields`](crate::Measurement::fields).
///
/// Mirrors [`GenericValue`] plus the two tags that mark a field as not
/// convertible: collection-valued fields and anything else outside the
/// supported scalar set. Both are skipped — silently — during conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    Bool(bool),
    Text(String),
    /// A repeated/collection-valued field. Explicitly unsupported.
    Repeated,
    /// Any other field type the record model cannot carry.
    Unsupported,
}

impl FieldValue {
    /// Convert into the record-side value, or `None` if the field is to
    /// be omitted from the record.
    pub fn into_generic(self) -> Option<GenericValue> {
        match self {
            FieldValue::Int32(v) => Some(GenericValue::Int32(v)),
            FieldValue::Int64(v) => Some(GenericValue::Int64(v)),
            FieldValue::UInt32(v) => Some(GenericValue::UInt32(v)),
            FieldValue::UInt64(v) => Some(GenericValue::UInt64(v)),
            FieldValue::Double(v) => Some(GenericValue::Double(v)),
            FieldValue::Bool(v) => Some(GenericValue::Bool(v)),
            FieldValue::Text(v) => Some(GenericValue::Text(v)),
            FieldValue::Repeated | FieldValue::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_conversion_preserves_value() {
        assert_eq!(
            FieldValue::Int32(-7).into_generic(),
            Some(GenericValue::Int32(-7))
        );
        assert_eq!(
            FieldValue::Text("idle".into()).into_generic(),
            Some(GenericValue::Text("idle".into()))
        );
    }

    #[test]
    fn unsupported_kinds_convert_to_none() {
        assert_eq!(FieldValue::Repeated.into_generic(), None);
        assert_eq!(FieldValue::Unsupported.into_generic(), None);
    }

    #[test]
    fn wire_shape_is_tagged() {
        let v = GenericValue::Int32(42);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "int32");
        assert_eq!(json["value"], 42);
    }
}
