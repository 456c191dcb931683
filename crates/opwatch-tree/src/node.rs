//! Per-component monitoring state and the publish path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::Instant;

use arc_swap::ArcSwap;
use tracing::{debug, error, warn};

use opwatch_record::{Measurement, OriginId, epoch_micros, to_record};

use crate::facility::{Facility, default_facility};
use crate::level::{self, Level, publishable_metric};
use crate::monitorable::Monitorable;

/// Sized wrapper so the facility handle fits in an `ArcSwap` slot.
struct FacilitySlot(Arc<dyn Facility>);

/// Counter snapshot taken (and zeroed) by `collect`.
pub(crate) struct CounterSnapshot {
    pub published: u64,
    pub ignored: u64,
    pub errors: u64,
    pub cpu_us: u64,
}

/// The monitoring state a component embeds to become a node in the tree.
///
/// Holds the node's name and parent identity, its verbosity threshold,
/// the facility slot, the published/ignored/error/cpu counters, and the
/// weak child registry. The node never owns its children — ownership
/// stays with whoever created them, and dead links are discovered lazily.
///
/// Counters are independent relaxed atomics, read-and-reset by `collect`;
/// a publish racing a collect may land its increment in either snapshot
/// window, which is an accepted skew. The facility slot is replaced
/// atomically as a whole reference, so `publish` never blocks on a
/// concurrent property inheritance and never observes a torn handle.
pub struct MonitorNode {
    name: RwLock<String>,
    parent_id: RwLock<OriginId>,
    level: AtomicU32,
    facility: ArcSwap<FacilitySlot>,
    published: AtomicU64,
    ignored: AtomicU64,
    errors: AtomicU64,
    cpu_us: AtomicU64,
    children: Mutex<HashMap<String, Weak<dyn Monitorable>>>,
}

impl MonitorNode {
    /// A free-standing node with an unset origin, the default verbosity
    /// band, and the process-wide null facility. Safe to publish into
    /// immediately; origin, level, and facility are overwritten when the
    /// node is registered under a parent.
    pub fn new() -> Self {
        Self::with_origin(OriginId::default())
    }

    /// A node whose records originate from `origin` (used for tree roots;
    /// child nodes get their identity from registration instead).
    pub fn with_origin(origin: OriginId) -> Self {
        Self {
            name: RwLock::new(String::new()),
            parent_id: RwLock::new(origin),
            level: AtomicU32::new(level::DEFAULT),
            facility: ArcSwap::from_pointee(FacilitySlot(default_facility())),
            published: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            cpu_us: AtomicU64::new(0),
            children: Mutex::new(HashMap::new()),
        }
    }

    /// This node's full identifier: the parent's identifier extended with
    /// the name it was registered under.
    pub fn id(&self) -> OriginId {
        let parent = self.parent_id.read().unwrap();
        parent.child(&self.name.read().unwrap())
    }

    /// Current verbosity threshold.
    pub fn level(&self) -> Level {
        self.level.load(Ordering::Relaxed)
    }

    /// Replace this node's facility. Affects this node only; registration
    /// propagates a parent's facility to the whole subtree, so wire up a
    /// root before registering children under it.
    pub fn set_facility(&self, facility: Arc<dyn Facility>) {
        self.facility.store(Arc::new(FacilitySlot(facility)));
    }

    /// Publish one measurement through this node.
    ///
    /// Never reports failure to the caller: level suppression increments
    /// the ignored counter, an empty record is logged and dropped, and a
    /// facility failure is logged and counted as an error. The wall-clock
    /// cost of the whole attempt is accumulated into the cpu counter
    /// regardless of outcome.
    pub fn publish(
        &self,
        measurement: &dyn Measurement,
        custom_origin: Option<OriginId>,
        entry_level: Level,
    ) {
        let start = Instant::now();
        self.dispatch(measurement, custom_origin, entry_level);
        self.cpu_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
    }

    fn dispatch(
        &self,
        measurement: &dyn Measurement,
        custom_origin: Option<OriginId>,
        entry_level: Level,
    ) {
        if !publishable_metric(entry_level, self.level()) {
            debug!(
                measurement = measurement.type_name(),
                entry_level, "entry suppressed by level"
            );
            self.ignored.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut record = to_record(measurement, "");
        if record.is_empty() {
            warn!(
                measurement = %record.measurement,
                node = %self.id(),
                "entry with no data"
            );
            return;
        }

        record.origin = custom_origin.unwrap_or_else(|| self.id());
        record.timestamp_us = epoch_micros();

        // The slot always holds a facility, if only the null default.
        let facility = self.facility.load();
        match facility.0.publish(record) {
            Ok(()) => {
                self.published.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                error!(node = %self.id(), error = %err, "facility publish failed");
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn set_name(&self, name: &str) {
        *self.name.write().unwrap() = name.to_string();
    }

    pub(crate) fn set_parent_id(&self, id: OriginId) {
        *self.parent_id.write().unwrap() = id;
    }

    pub(crate) fn set_local_level(&self, level: Level) {
        self.level.store(level, Ordering::Relaxed);
    }

    pub(crate) fn facility(&self) -> Arc<dyn Facility> {
        self.facility.load().0.clone()
    }

    pub(crate) fn add_errors(&self, n: u64) {
        self.errors.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn take_counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            published: self.published.swap(0, Ordering::Relaxed),
            ignored: self.ignored.swap(0, Ordering::Relaxed),
            errors: self.errors.swap(0, Ordering::Relaxed),
            cpu_us: self.cpu_us.swap(0, Ordering::Relaxed),
        }
    }

    /// Exclusive access to the child registry. Guards registration, the
    /// prune/recurse phase of collection, and both propagation fan-outs.
    pub(crate) fn children(&self) -> MutexGuard<'_, HashMap<String, Weak<dyn Monitorable>>> {
        self.children.lock().unwrap()
    }
}

impl Default for MonitorNode {
    fn default() -> Self {
        Self::new()
    }
}
