//! The aggregate produced by one collection walk.

use serde::{Deserialize, Serialize};

use opwatch_record::{FieldValue, Measurement};

/// Counters aggregated bottom-up by one `collect()` call.
///
/// Every field sums field-wise across sibling subtrees except
/// `wall_elapsed_us`, which each node measures independently for its own
/// call and never inherits from children. Implements [`Measurement`] so
/// the manager can re-publish the tree walk itself as a metric.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Entries in children maps across the subtree, dead links included.
    pub n_registered_nodes: u64,
    /// Nodes whose own published counter was nonzero at their snapshot.
    pub n_publishing_nodes: u64,
    /// Dead child links pruned during this walk.
    pub n_invalid_links: u64,
    pub n_published_measurements: u64,
    pub n_ignored_measurements: u64,
    pub n_errors: u64,
    /// Accumulated publish-path cost across the subtree, microseconds.
    pub cpu_elapsed_us: u64,
    /// Wall-clock duration of this node's own collect call, microseconds.
    pub wall_elapsed_us: u64,
}

impl CollectionSummary {
    /// Fold a child subtree's summary into this one. Wall-clock time is
    /// deliberately left alone.
    pub fn absorb(&mut self, child: &CollectionSummary) {
        self.n_registered_nodes += child.n_registered_nodes;
        self.n_publishing_nodes += child.n_publishing_nodes;
        self.n_invalid_links += child.n_invalid_links;
        self.n_published_measurements += child.n_published_measurements;
        self.n_ignored_measurements += child.n_ignored_measurements;
        self.n_errors += child.n_errors;
        self.cpu_elapsed_us += child.cpu_elapsed_us;
    }
}

impl Measurement for CollectionSummary {
    fn type_name(&self) -> &str {
        "opwatch.CollectionSummary"
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("n_registered_nodes", FieldValue::UInt64(self.n_registered_nodes)),
            ("n_publishing_nodes", FieldValue::UInt64(self.n_publishing_nodes)),
            ("n_invalid_links", FieldValue::UInt64(self.n_invalid_links)),
            (
                "n_published_measurements",
                FieldValue::UInt64(self.n_published_measurements),
            ),
            (
                "n_ignored_measurements",
                FieldValue::UInt64(self.n_ignored_measurements),
            ),
            ("n_errors", FieldValue::UInt64(self.n_errors)),
            ("cpu_elapsed_us", FieldValue::UInt64(self.cpu_elapsed_us)),
            ("wall_elapsed_us", FieldValue::UInt64(self.wall_elapsed_us)),
        ]
    }
}
