//! Fleet sweep: one reconciliation pass over all enabled nodes.
//!
//! Every enabled record with a live handle is reconciled concurrently;
//! records with no handle are skipped (installing one is a lifecycle
//! concern). Failures are caught at the node boundary, so one broken or
//! slow node never stalls or aborts the sweep over the others.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::FleetResult;
use crate::node::NodeRegistry;
use crate::reconcile::Reconciler;
use crate::storage::NodeStore;

/// Fan-out driver for the reconciler.
pub struct FleetSweep {
    store: Arc<dyn NodeStore>,
    registry: Arc<NodeRegistry>,
    reconciler: Arc<Reconciler>,
    in_flight: Mutex<()>,
}

impl FleetSweep {
    pub fn new(
        store: Arc<dyn NodeStore>,
        registry: Arc<NodeRegistry>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        Self {
            store,
            registry,
            reconciler,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one sweep.
    ///
    /// At most one sweep is in flight at a time: a trigger that arrives
    /// while one is running is dropped, and `Ok(None)` is returned.
    /// Otherwise returns the number of nodes reconciled.
    pub async fn run(&self) -> FleetResult<Option<usize>> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("fleet sweep already in flight, dropping trigger");
            return Ok(None);
        };

        let records = self.store.list_enabled().await?;
        let handles = self.registry.snapshot().await;

        let tasks: Vec<_> = records
            .iter()
            .filter_map(|record| {
                let client = handles.get(&record.id)?.clone();
                Some(async move {
                    if let Err(err) = self.reconciler.reconcile_node(record, client).await {
                        error!(
                            node_id = %record.id,
                            node = %record.name,
                            error = %err,
                            "node reconciliation failed"
                        );
                    }
                })
            })
            .collect();

        let count = tasks.len();
        debug!(nodes = count, "running fleet sweep");
        join_all(tasks).await;

        Ok(Some(count))
    }
}
