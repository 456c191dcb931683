//! opwatch-record — the opwatch data model.
//!
//! Defines the schema-less record shape that every publishing facility
//! consumes, and the introspection capability measurement types supply
//! so they can be converted without per-type code.
//!
//! # Architecture
//!
//! ```text
//! Measurement (trait: type name + typed scalar fields)
//!   │
//!   ▼ to_record() — skips repeated/unsupported fields
//! GenericRecord { timestamp, measurement, sub_id, origin, data }
//!   │                                              │
//!   │                                              └── name → GenericValue
//!   ▼
//! RecordBatch (append-only, order-preserving)
//! ```
//!
//! The record shape — not any specific encoding — is the compatibility
//! surface downstream tooling depends on; every type here derives serde.

pub mod id;
pub mod measurement;
pub mod record;
pub mod value;

pub use id::OriginId;
pub use measurement::Measurement;
pub use record::{GenericRecord, RecordBatch, epoch_micros, to_record};
pub use value::{FieldValue, GenericValue};
