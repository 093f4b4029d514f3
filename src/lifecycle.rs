//! Node lifecycle: connecting, disconnecting, and shutdown.
//!
//! Bulk operations fan out concurrently and isolate per-node failures:
//! one unreachable node never aborts the startup connect or the shutdown
//! stop of its siblings.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::config::FleetConfig;
use crate::error::FleetResult;
use crate::events::{FleetEvent, FleetEvents};
use crate::node::{NodeClient, NodeConnector, NodeRegistry};
use crate::storage::NodeStore;
use crate::types::{NodeId, NodeRecord, NodeStatus, StatusUpdate};

/// Installs, replaces, and removes node handles.
pub struct LifecycleManager {
    registry: Arc<NodeRegistry>,
    store: Arc<dyn NodeStore>,
    connector: Arc<dyn NodeConnector>,
    events: FleetEvents,
    stop_timeout: Duration,
}

impl LifecycleManager {
    pub fn new(
        registry: Arc<NodeRegistry>,
        store: Arc<dyn NodeStore>,
        connector: Arc<dyn NodeConnector>,
        events: FleetEvents,
        config: &FleetConfig,
    ) -> Self {
        Self {
            registry,
            store,
            connector,
            events,
            stop_timeout: config.stop_timeout,
        }
    }

    /// Install or refresh the handle for one node.
    ///
    /// Used both for normal reconnection and operator-initiated reconnect.
    /// Any prior handle is replaced atomically and torn down in the
    /// background.
    pub async fn connect_single(&self, record: &NodeRecord) -> FleetResult<Arc<dyn NodeClient>> {
        info!(node_id = %record.id, node = %record.name, "connecting node");

        self.store
            .update_status(record.id, StatusUpdate::to(NodeStatus::Connecting))
            .await?;
        self.events.emit(FleetEvent::StatusChanged {
            node_id: record.id,
            name: record.name.clone(),
            status: NodeStatus::Connecting,
            message: None,
        });

        let client = self.connector.connect(record).await?;
        let client = self.registry.upsert(record.id, client).await;

        self.events.emit(FleetEvent::HandleInstalled {
            node_id: record.id,
            name: record.name.clone(),
        });

        Ok(client)
    }

    /// Connect every given node concurrently. Per-node failures are
    /// logged and never abort the batch; an empty set is valid.
    pub async fn connect_bulk(&self, records: &[NodeRecord]) -> FleetResult<()> {
        let tasks = records.iter().map(|record| async move {
            if let Err(err) = self.connect_single(record).await {
                error!(node_id = %record.id, node = %record.name, error = %err, "failed to connect node");
            }
        });
        join_all(tasks).await;
        Ok(())
    }

    /// Startup path: connect every enabled record.
    pub async fn connect_enabled(&self) -> FleetResult<()> {
        let records = self.store.list_enabled().await?;

        if records.is_empty() {
            warn!("no enabled nodes to connect");
            return Ok(());
        }

        info!(count = records.len(), "connecting enabled nodes");
        self.connect_bulk(&records).await?;
        info!("all enabled nodes started");
        Ok(())
    }

    /// Remove the handle for `id`, tearing it down in the background.
    ///
    /// Used by the limit enforcer and operator disable. Returns whether a
    /// handle existed.
    pub async fn disconnect_single(&self, id: NodeId) -> bool {
        let removed = self.registry.remove(id).await;
        if removed {
            info!(node_id = %id, "disconnected node");
            self.events.emit(FleetEvent::HandleRemoved { node_id: id });
        }
        removed
    }

    /// Shutdown path: concurrently stop every live handle, best-effort.
    ///
    /// Each stop is bounded so an unresponsive node cannot stall shutdown.
    pub async fn stop_all(&self) {
        let nodes = self.registry.list().await;
        info!(count = nodes.len(), "stopping node handles");

        let stop_timeout = self.stop_timeout;
        let tasks = nodes.into_iter().map(|(id, node)| async move {
            match tokio::time::timeout(stop_timeout, node.stop()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(node_id = %id, error = %err, "node stop failed"),
                Err(_) => warn!(node_id = %id, "node stop timed out"),
            }
        });
        join_all(tasks).await;

        info!("all node handles stopped");
    }
}
