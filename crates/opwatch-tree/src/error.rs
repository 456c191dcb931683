//! Error types for the monitoring tree.

use thiserror::Error;

/// Failure to register a child node.
///
/// This is the one operation in the steady-state API that reports loudly:
/// a duplicate live name is a programming mistake the caller should fix,
/// not a condition to absorb into counters.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("node name {name:?} already registered under {node}")]
    DuplicateNodeName { name: String, node: String },
}

/// Failure reported by a publishing facility.
///
/// Counted and logged by the publish path, never escalated to the caller
/// and never retried.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The facility refused or failed to ship the record.
    #[error("facility rejected record for {measurement}: {reason}")]
    Rejected { measurement: String, reason: String },

    /// The facility is no longer accepting records at all.
    #[error("facility closed")]
    Closed,
}
