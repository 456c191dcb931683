//! The publishing facility seam.

use std::sync::{Arc, LazyLock};

use opwatch_record::GenericRecord;

use crate::error::PublishError;

/// External sink that ships finished records out of process.
///
/// Implementations must be safe to call concurrently from many nodes.
/// From the tree's perspective a publish is bounded-time; blocking and
/// timeout policy live on the facility side.
pub trait Facility: Send + Sync {
    fn publish(&self, record: GenericRecord) -> Result<(), PublishError>;
}

/// A facility that accepts everything and does nothing.
///
/// The process-wide default: a node created without an explicitly wired
/// facility publishes into this and is therefore always safe to use.
#[derive(Debug, Default)]
pub struct NullFacility;

impl Facility for NullFacility {
    fn publish(&self, _record: GenericRecord) -> Result<(), PublishError> {
        Ok(())
    }
}

static DEFAULT_FACILITY: LazyLock<Arc<NullFacility>> = LazyLock::new(|| Arc::new(NullFacility));

/// The shared process-wide default facility (a [`NullFacility`]).
///
/// Created lazily on first use and lives for the rest of the process;
/// individual nodes can swap in a real facility at any time via property
/// inheritance from a wired-up parent.
pub fn default_facility() -> Arc<dyn Facility> {
    DEFAULT_FACILITY.clone()
}
