//! Fleet events for notification delivery.
//!
//! Components emit events on a broadcast channel; delivery (operator
//! notifications, webhooks) subscribes from outside this crate. Emission
//! never fails: a channel with no subscribers simply drops the event.

use tokio::sync::broadcast;

use crate::types::{NodeId, NodeStatus};

/// Events emitted by the fleet controller.
#[derive(Debug, Clone)]
pub enum FleetEvent {
    /// A node's persisted status changed.
    StatusChanged {
        node_id: NodeId,
        name: String,
        status: NodeStatus,
        message: Option<String>,
    },

    /// A node was suspended because its traffic allowance is exhausted.
    /// Replaces the routine status-change event for that transition.
    NodeLimited {
        node_id: NodeId,
        name: String,
        used_traffic: u64,
        data_limit: u64,
    },

    /// A handle was installed or refreshed for a node.
    HandleInstalled { node_id: NodeId, name: String },

    /// A node's handle was removed.
    HandleRemoved { node_id: NodeId },
}

/// Broadcast sender for fleet events.
#[derive(Debug, Clone)]
pub struct FleetEvents {
    tx: broadcast::Sender<FleetEvent>,
}

impl FleetEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to fleet events.
    pub fn subscribe(&self) -> broadcast::Receiver<FleetEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring the no-subscriber case.
    pub fn emit(&self, event: FleetEvent) {
        let _ = self.tx.send(event);
    }
}
