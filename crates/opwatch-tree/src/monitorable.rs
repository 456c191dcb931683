//! The `Monitorable` trait: the tree protocol every node speaks.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use opwatch_record::{Measurement, OriginId};

use crate::error::RegisterError;
use crate::level::Level;
use crate::node::MonitorNode;
use crate::summary::CollectionSummary;

/// A component that participates in the monitoring tree.
///
/// Implementors embed a [`MonitorNode`] and expose it through
/// [`monitor_node`](Monitorable::monitor_node); the tree protocol —
/// registration, publishing, collection, level and property propagation —
/// is provided and should not be overridden. The one hook a component
/// customises is [`generate_data`](Monitorable::generate_data), invoked
/// on every collection walk to produce the component's metrics.
///
/// The tree holds children as `Weak` references: registering a child
/// never extends its lifetime, and a destroyed child is pruned lazily by
/// the next walk.
pub trait Monitorable: Send + Sync {
    /// The monitoring state embedded in this component.
    fn monitor_node(&self) -> &MonitorNode;

    /// Produce this node's metrics, typically via one or more
    /// [`publish`](Monitorable::publish) calls. The default produces
    /// nothing. Errors are absorbed by the collection walk: the whole
    /// cause chain is counted and logged, never propagated.
    fn generate_data(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Publish one measurement through this node's state. See
    /// [`MonitorNode::publish`] — infallible by design.
    fn publish(
        &self,
        measurement: &dyn Measurement,
        custom_origin: Option<OriginId>,
        entry_level: Level,
    ) {
        self.monitor_node()
            .publish(measurement, custom_origin, entry_level);
    }

    /// Register `child` under `name`.
    ///
    /// Names must be unique among currently-live children: a collision
    /// with a live entry is rejected (the caller's bug to fix), while a
    /// collision with a dead entry only logs a warning and heals by
    /// replacement. On success the child learns its name and inherits
    /// this node's facility, level, and identity, transitively through
    /// the child's own already-registered descendants.
    fn register_child(
        &self,
        name: &str,
        child: &Arc<dyn Monitorable>,
    ) -> Result<(), RegisterError> {
        let node = self.monitor_node();
        let mut children = node.children();

        if let Some(existing) = children.get(name) {
            if existing.upgrade().is_some() {
                return Err(RegisterError::DuplicateNodeName {
                    name: name.to_string(),
                    node: node.id().to_string(),
                });
            }
            warn!(name, node = %node.id(), "reusing name of a destroyed child node");
        }

        children.insert(name.to_string(), Arc::downgrade(child));
        child.monitor_node().set_name(name);
        child.inherit_parent_properties(node);

        debug!(name, node = %node.id(), "child node registered");
        Ok(())
    }

    /// Walk this subtree: run the data-generation hook, snapshot and
    /// reset this node's counters, recurse into live children, prune dead
    /// links, and return the bottom-up aggregate. Never fails; every
    /// internal failure is counted and logged.
    fn collect(&self) -> CollectionSummary {
        let start = Instant::now();
        let node = self.monitor_node();
        debug!(node = %node.id(), "collecting monitoring data");

        if let Err(err) = self.generate_data() {
            // One error per link of the cause chain, outermost included.
            node.add_errors(err.chain().count() as u64);
            let chain = format!("{err:#}");
            error!(node = %node.id(), error = %chain, "data generation failed");
        }

        let counters = node.take_counters();
        let mut summary = CollectionSummary {
            n_published_measurements: counters.published,
            n_ignored_measurements: counters.ignored,
            n_errors: counters.errors,
            cpu_elapsed_us: counters.cpu_us,
            ..CollectionSummary::default()
        };
        if summary.n_published_measurements > 0 {
            summary.n_publishing_nodes = 1;
        }

        {
            let mut children = node.children();
            summary.n_registered_nodes += children.len() as u64;
            children.retain(|_, weak| match weak.upgrade() {
                Some(child) => {
                    summary.absorb(&child.collect());
                    true
                }
                None => {
                    summary.n_invalid_links += 1;
                    false
                }
            });
        }

        // Own wall time only; child wall times are not summed.
        summary.wall_elapsed_us = start.elapsed().as_micros() as u64;
        summary
    }

    /// Set this node's verbosity threshold and propagate it to every
    /// currently-live descendant. Does not touch the facility.
    fn set_level(&self, level: Level) {
        let node = self.monitor_node();
        node.set_local_level(level);

        let children = node.children();
        for weak in children.values() {
            if let Some(child) = weak.upgrade() {
                child.set_level(level);
            }
        }
    }

    /// Adopt `parent`'s facility, level, and identity, then re-apply
    /// top-down through live children so the whole subtree reads the
    /// just-updated state. Called by registration; callable again
    /// whenever a parent is re-wired.
    fn inherit_parent_properties(&self, parent: &MonitorNode) {
        let node = self.monitor_node();
        node.set_facility(parent.facility());
        node.set_parent_id(parent.id());
        node.set_local_level(parent.level());

        let children = node.children();
        for weak in children.values() {
            if let Some(child) = weak.upgrade() {
                child.inherit_parent_properties(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::{CounterInfo, RecordingFacility};
    use anyhow::Context;

    /// A component that publishes one counter per collection.
    struct Sensor {
        node: MonitorNode,
        value: i32,
    }

    impl Sensor {
        fn new(value: i32) -> Arc<Self> {
            Arc::new(Self {
                node: MonitorNode::new(),
                value,
            })
        }
    }

    impl Monitorable for Sensor {
        fn monitor_node(&self) -> &MonitorNode {
            &self.node
        }

        fn generate_data(&self) -> anyhow::Result<()> {
            self.publish(
                &CounterInfo { count: self.value },
                None,
                crate::level::ALWAYS,
            );
            Ok(())
        }
    }

    /// A component whose hook always fails with a two-deep cause chain.
    struct Broken {
        node: MonitorNode,
    }

    impl Monitorable for Broken {
        fn monitor_node(&self) -> &MonitorNode {
            &self.node
        }

        fn generate_data(&self) -> anyhow::Result<()> {
            Err(std::io::Error::other("device gone"))
                .context("reading sensor bank")
                .context("generating link metrics")
        }
    }

    fn root_with_facility() -> (Arc<Sensor>, Arc<RecordingFacility>) {
        let facility = Arc::new(RecordingFacility::default());
        let root = Arc::new(Sensor {
            node: MonitorNode::with_origin(OriginId::new("daq", "reader")),
            value: 0,
        });
        root.node.set_facility(facility.clone());
        (root, facility)
    }

    #[test]
    fn register_then_collect_aggregates_children() {
        let (root, facility) = root_with_facility();
        let a = Sensor::new(1);
        let b = Sensor::new(2);

        root.register_child("a", &(a.clone() as Arc<dyn Monitorable>))
            .unwrap();
        root.register_child("b", &(b.clone() as Arc<dyn Monitorable>))
            .unwrap();

        let summary = root.collect();
        assert_eq!(summary.n_registered_nodes, 2);
        // Root + both children published one record each.
        assert_eq!(summary.n_published_measurements, 3);
        assert_eq!(summary.n_publishing_nodes, 3);
        assert_eq!(summary.n_invalid_links, 0);
        assert_eq!(facility.records.lock().unwrap().len(), 3);
    }

    #[test]
    fn children_inherit_facility_level_and_identity() {
        let (root, facility) = root_with_facility();
        root.set_level(7);

        let child = Sensor::new(5);
        root.register_child("link0", &(child.clone() as Arc<dyn Monitorable>))
            .unwrap();

        assert_eq!(child.node.level(), 7);
        assert_eq!(child.node.id().to_string(), "daq.reader.link0");

        child.publish(&CounterInfo { count: 5 }, None, 7);
        let records = facility.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin.to_string(), "daq.reader.link0");
    }

    #[test]
    fn inheritance_reaches_grandchildren() {
        let (root, _facility) = root_with_facility();
        let mid = Sensor::new(1);
        let leaf = Sensor::new(2);

        mid.register_child("leaf", &(leaf.clone() as Arc<dyn Monitorable>))
            .unwrap();
        root.register_child("mid", &(mid.clone() as Arc<dyn Monitorable>))
            .unwrap();

        assert_eq!(leaf.node.id().to_string(), "daq.reader.mid.leaf");
    }

    #[test]
    fn duplicate_live_name_is_rejected() {
        let (root, _) = root_with_facility();
        let first = Sensor::new(1);
        let second = Sensor::new(2);

        root.register_child("a", &(first.clone() as Arc<dyn Monitorable>))
            .unwrap();
        let err = root
            .register_child("a", &(second.clone() as Arc<dyn Monitorable>))
            .unwrap_err();

        assert!(matches!(
            err,
            RegisterError::DuplicateNodeName { ref name, .. } if name == "a"
        ));
    }

    #[test]
    fn dead_name_can_be_reused() {
        let (root, _) = root_with_facility();
        let first = Sensor::new(1);
        root.register_child("a", &(first.clone() as Arc<dyn Monitorable>))
            .unwrap();
        drop(first);

        let second = Sensor::new(2);
        root.register_child("a", &(second.clone() as Arc<dyn Monitorable>))
            .unwrap();
    }

    #[test]
    fn collect_prunes_dead_links() {
        let (root, _) = root_with_facility();
        let a = Sensor::new(1);
        let b = Sensor::new(2);
        root.register_child("a", &(a.clone() as Arc<dyn Monitorable>))
            .unwrap();
        root.register_child("b", &(b.clone() as Arc<dyn Monitorable>))
            .unwrap();
        drop(a);

        let summary = root.collect();
        assert_eq!(summary.n_invalid_links, 1);
        // The dead entry still counted as registered in the walk that
        // pruned it.
        assert_eq!(summary.n_registered_nodes, 2);

        let summary = root.collect();
        assert_eq!(summary.n_invalid_links, 0);
        assert_eq!(summary.n_registered_nodes, 1);
    }

    #[test]
    fn hook_failure_counts_whole_cause_chain() {
        let broken = Arc::new(Broken {
            node: MonitorNode::new(),
        });

        let summary = broken.collect();
        // Outer context + middle context + io::Error.
        assert_eq!(summary.n_errors, 3);
        assert_eq!(summary.n_published_measurements, 0);
    }

    #[test]
    fn failing_child_does_not_stop_siblings() {
        let (root, _) = root_with_facility();
        let broken: Arc<dyn Monitorable> = Arc::new(Broken {
            node: MonitorNode::new(),
        });
        let ok = Sensor::new(1);

        root.register_child("broken", &broken).unwrap();
        root.register_child("ok", &(ok.clone() as Arc<dyn Monitorable>))
            .unwrap();

        let summary = root.collect();
        assert_eq!(summary.n_errors, 3);
        // Root + healthy child still published.
        assert_eq!(summary.n_published_measurements, 2);
    }

    #[test]
    fn set_level_propagates_to_descendants() {
        let (root, _) = root_with_facility();
        let mid = Sensor::new(1);
        let leaf = Sensor::new(2);
        mid.register_child("leaf", &(leaf.clone() as Arc<dyn Monitorable>))
            .unwrap();
        root.register_child("mid", &(mid.clone() as Arc<dyn Monitorable>))
            .unwrap();

        root.set_level(3);
        assert_eq!(root.node.level(), 3);
        assert_eq!(mid.node.level(), 3);
        assert_eq!(leaf.node.level(), 3);
    }
}
