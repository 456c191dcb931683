//! Verbosity levels and the publish filtering policy.
//!
//! Lower numeric level means higher priority: a level-0 entry is always
//! shown, large levels are debug chatter. A node publishes an entry iff
//! the entry's level does not exceed the node's threshold.

/// Integer verbosity threshold carried by nodes and entries.
pub type Level = u32;

/// Entries that must always be published.
pub const ALWAYS: Level = 0;
/// High-priority entries, shown in any reasonable configuration.
pub const PRIORITY: Level = u32::MAX / 4;
/// The default band for ordinary steady-state metrics.
pub const DEFAULT: Level = u32::MAX / 2;
/// Debug-only entries, suppressed unless a node is opened wide up.
pub const DEBUG: Level = u32::MAX / 4 * 3;

/// The filtering policy: publish iff the entry level does not exceed the
/// node's threshold.
pub fn publishable_metric(entry: Level, node: Level) -> bool {
    entry <= node
}
