//! opwatch-tree — hierarchical monitoring registry.
//!
//! Components embed a [`MonitorNode`], implement [`Monitorable`], and form
//! a tree by registering child nodes under stable names. The tree holds
//! only weak references: a node's lifetime belongs to whoever created it,
//! and dead links are pruned lazily during collection.
//!
//! # Architecture
//!
//! ```text
//! MonitorManager
//!   ├── start() → periodic tokio task
//!   │     └── root.collect() → CollectionSummary (republished as a metric)
//!   └── register_child() → root node
//!
//! Monitorable (per component)
//!   ├── generate_data() hook → publish() zero or more times
//!   ├── publish() → level filter → GenericRecord → Facility
//!   └── collect() → own counters + recursive child summaries
//! ```
//!
//! `publish` and `collect` never fail to their caller: every failure is
//! converted into counter increments plus tracing diagnostics, so a
//! best-effort periodic driver cannot be destabilized by one bad subtree.
//! The single loud path is [`Monitorable::register_child`], which rejects
//! duplicate live names.

pub mod error;
pub mod facility;
pub mod level;
pub mod manager;
pub mod monitorable;
pub mod node;
pub mod summary;

pub use error::{PublishError, RegisterError};
pub use facility::{Facility, NullFacility, default_facility};
pub use level::{Level, publishable_metric};
pub use manager::MonitorManager;
pub use monitorable::Monitorable;
pub use node::MonitorNode;
pub use summary::CollectionSummary;
