//! The tree root and its periodic collection driver.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use opwatch_record::OriginId;

use crate::error::RegisterError;
use crate::facility::Facility;
use crate::level::{self, Level};
use crate::monitorable::Monitorable;
use crate::node::MonitorNode;
use crate::summary::CollectionSummary;

/// The root of a monitoring tree: holds state but generates no data of
/// its own.
struct RootNode {
    node: MonitorNode,
}

impl Monitorable for RootNode {
    fn monitor_node(&self) -> &MonitorNode {
        &self.node
    }
}

/// Handle to the running collection task.
struct LoopSlot {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

/// Owns the root of a monitoring tree and drives periodic collection.
///
/// Application components register themselves (or their subtree roots)
/// with [`register_child`](MonitorManager::register_child); `start` then
/// spawns a background task that walks the tree at a fixed interval and
/// republishes each walk's [`CollectionSummary`] through the root node as
/// a measurement of its own. Callers that schedule collection themselves
/// use [`collect_once`](MonitorManager::collect_once) instead.
pub struct MonitorManager {
    root: Arc<RootNode>,
    slot: Mutex<Option<LoopSlot>>,
}

impl MonitorManager {
    /// A manager publishing into the process-wide null facility. Useful
    /// for tests and for applications that only ever read summaries.
    pub fn new(session: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            root: Arc::new(RootNode {
                node: MonitorNode::with_origin(OriginId::new(session, application)),
            }),
            slot: Mutex::new(None),
        }
    }

    /// A manager wired to a concrete facility. Wire the facility before
    /// registering children so they inherit it.
    pub fn with_facility(
        session: impl Into<String>,
        application: impl Into<String>,
        facility: Arc<dyn Facility>,
    ) -> Self {
        let manager = Self::new(session, application);
        manager.root.node.set_facility(facility);
        manager
    }

    /// Register a component under the tree root. See
    /// [`Monitorable::register_child`].
    pub fn register_child(
        &self,
        name: &str,
        child: &Arc<dyn Monitorable>,
    ) -> Result<(), RegisterError> {
        self.root.register_child(name, child)
    }

    /// Walk the whole tree once, on demand.
    pub fn collect_once(&self) -> CollectionSummary {
        self.root.collect()
    }

    /// Set the verbosity threshold for the whole tree.
    pub fn set_level(&self, level: Level) {
        self.root.set_level(level);
    }

    /// Start the periodic collection loop. Must be called from within a
    /// tokio runtime. Restarting replaces the previous loop.
    pub fn start(&self, interval: Duration, tree_level: Level) {
        self.root.set_level(tree_level);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let root = self.root.clone();
        let handle = tokio::spawn(async move {
            run_collection_loop(root, interval, shutdown_rx).await;
        });

        let mut slot = self.slot.lock().unwrap();
        if let Some(old) = slot.replace(LoopSlot {
            handle,
            shutdown_tx,
        }) {
            let _ = old.shutdown_tx.send(true);
            old.handle.abort();
        }

        info!(interval_secs = interval.as_secs(), "collection loop started");
    }

    /// Stop the collection loop. Idempotent; a final walk runs before the
    /// task exits.
    pub fn stop(&self) {
        let mut slot = self.slot.lock().unwrap();
        if let Some(old) = slot.take() {
            let _ = old.shutdown_tx.send(true);
            info!("collection loop stopping");
        }
    }

    /// True while the background loop is running.
    pub fn is_running(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }
}

impl Drop for MonitorManager {
    fn drop(&mut self) {
        if let Some(old) = self.slot.lock().unwrap().take() {
            let _ = old.shutdown_tx.send(true);
            old.handle.abort();
        }
    }
}

/// The collection loop for one tree.
async fn run_collection_loop(
    root: Arc<RootNode>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                publish_walk(&root);
            }
            _ = shutdown.changed() => {
                // Final walk so nothing accumulated since the last tick
                // is lost.
                publish_walk(&root);
                debug!(node = %root.node.id(), "collection loop shut down");
                break;
            }
        }
    }
}

fn publish_walk(root: &Arc<RootNode>) {
    let summary = root.collect();
    debug!(
        node = %root.node.id(),
        published = summary.n_published_measurements,
        errors = summary.n_errors,
        invalid_links = summary.n_invalid_links,
        "collection walk finished"
    );
    root.publish(&summary, None, level::ALWAYS);
}
