//! Generic records and the append-only record batch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::id::OriginId;
use crate::measurement::Measurement;
use crate::value::GenericValue;

/// A schema-less snapshot of one measurement.
///
/// Field names are unique (map keys); insertion order carries no meaning.
/// This shape — not any particular encoding — is the compatibility
/// surface facilities and downstream tooling depend on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRecord {
    /// Unix timestamp in microseconds, refreshed at dispatch time.
    pub timestamp_us: u64,
    /// Wire/type name of the source measurement.
    pub measurement: String,
    /// Optional sub-identifier distinguishing multiple records of the
    /// same measurement type from one node. Empty by default.
    #[serde(default)]
    pub sub_id: String,
    /// Identifier of the node this record originates from.
    pub origin: OriginId,
    /// Field name → tagged value.
    pub data: BTreeMap<String, GenericValue>,
}

impl GenericRecord {
    /// True if the record carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Current wall-clock time as Unix microseconds.
pub fn epoch_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// Convert one measurement into a generic record.
///
/// Every supported scalar field lands in the record's data map; repeated
/// and unsupported fields are skipped without error. The returned record
/// may be empty — callers decide whether an empty record is worth
/// keeping. This conversion never fails.
pub fn to_record(measurement: &dyn Measurement, sub_id: &str) -> GenericRecord {
    let mut data = BTreeMap::new();
    for (name, field) in measurement.fields() {
        if let Some(value) = field.into_generic() {
            data.insert(name.to_string(), value);
        }
    }
    GenericRecord {
        timestamp_us: epoch_micros(),
        measurement: measurement.type_name().to_string(),
        sub_id: sub_id.to_string(),
        origin: OriginId::default(),
        data,
    }
}

/// An ordered, append-only accumulation of generic records.
///
/// Used by facilities and drivers that gather several measurements before
/// shipping them as one unit. Records are never removed once added;
/// duplicates (the same measurement type added twice) are both retained.
#[derive(Debug, Default, Clone)]
pub struct RecordBatch {
    entries: Vec<GenericRecord>,
}

impl RecordBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert `measurement` and append the result, unless the conversion
    /// produced an empty record — those are dropped silently, which is
    /// the normal outcome for measurements made entirely of unsupported
    /// field types. Never fails.
    pub fn add(&mut self, measurement: &dyn Measurement, sub_id: &str) {
        let record = to_record(measurement, sub_id);
        if !record.is_empty() {
            self.entries.push(record);
        }
    }

    /// Everything accumulated so far, in insertion order.
    pub fn entries(&self) -> &[GenericRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
