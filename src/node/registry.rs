//! Concurrent registry of live node handles.
//!
//! Source of truth for "who is live": a mapping from node id to its
//! current handle, with at most one handle per id at any instant.
//! Absence of an entry means no runtime connection was attempted.
//!
//! Replacement is atomic within one write critical section; teardown of
//! the superseded handle runs on a detached task so it never blocks
//! readers or writers, and it completes even after the calling scope
//! returns. The lock is held only for the map mutation, never across
//! node I/O.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::node::client::NodeClient;
use crate::types::{Health, NodeId, NodeUser};

/// Concurrent map from node id to its live handle.
pub struct NodeRegistry {
    nodes: RwLock<HashMap<NodeId, Arc<dyn NodeClient>>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Install a handle for `id`, replacing any prior one.
    ///
    /// The old handle, if any, is torn down in the background; this call
    /// returns as soon as the new handle is installed.
    pub async fn upsert(&self, id: NodeId, client: Arc<dyn NodeClient>) -> Arc<dyn NodeClient> {
        let old = {
            let mut nodes = self.nodes.write().await;
            nodes.insert(id, client.clone())
        };

        if let Some(old) = old {
            debug!(node_id = %id, "replacing existing handle");
            Self::schedule_teardown(id, old);
        }

        client
    }

    /// Remove the handle for `id`, tearing it down in the background.
    ///
    /// Returns whether an entry existed. The entry is deleted before the
    /// teardown is scheduled.
    pub async fn remove(&self, id: NodeId) -> bool {
        let old = {
            let mut nodes = self.nodes.write().await;
            nodes.remove(&id)
        };

        match old {
            Some(old) => {
                Self::schedule_teardown(id, old);
                true
            }
            None => false,
        }
    }

    /// Invalidate and stop a superseded handle on a detached task.
    ///
    /// Each removed handle passes through here exactly once. Failures are
    /// logged and swallowed; teardown is never surfaced to the caller.
    fn schedule_teardown(id: NodeId, client: Arc<dyn NodeClient>) {
        tokio::spawn(async move {
            if let Err(error) = client.set_health(Health::Invalid).await {
                debug!(node_id = %id, %error, "failed to invalidate superseded handle");
            }
            if let Err(error) = client.stop().await {
                warn!(node_id = %id, %error, "failed to stop superseded handle");
            }
        });
    }

    /// Current handle for `id`, if one is installed.
    pub async fn get(&self, id: NodeId) -> Option<Arc<dyn NodeClient>> {
        let nodes = self.nodes.read().await;
        nodes.get(&id).cloned()
    }

    /// Snapshot of all live handles. May be stale relative to concurrent
    /// health transitions.
    pub async fn snapshot(&self) -> HashMap<NodeId, Arc<dyn NodeClient>> {
        let nodes = self.nodes.read().await;
        nodes.clone()
    }

    /// All live handles as a list.
    pub async fn list(&self) -> Vec<(NodeId, Arc<dyn NodeClient>)> {
        let nodes = self.nodes.read().await;
        nodes.iter().map(|(id, node)| (*id, node.clone())).collect()
    }

    /// Handles whose current health matches `predicate`.
    ///
    /// Healths are read outside the lock, so the result is best-effort.
    pub async fn list_by_health<F>(&self, predicate: F) -> Vec<(NodeId, Arc<dyn NodeClient>)>
    where
        F: Fn(Health) -> bool,
    {
        let snapshot = self.list().await;

        let mut matched = Vec::new();
        for (id, node) in snapshot {
            match node.health().await {
                Ok(health) if predicate(health) => matched.push((id, node)),
                Ok(_) => {}
                Err(error) => {
                    debug!(node_id = %id, %error, "skipping node with unreadable health")
                }
            }
        }
        matched
    }

    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    /// Replace the authorized-identity set on every live node.
    ///
    /// Handles are snapshotted first so no lock is held across node I/O.
    /// Per-node failures are logged, never propagated.
    pub async fn sync_users(&self, users: Vec<NodeUser>) {
        for (id, node) in self.list().await {
            if let Err(error) = node.sync_users(users.clone()).await {
                warn!(node_id = %id, %error, "failed to sync users to node");
            }
        }
    }

    /// Fire-and-forget variant of [`NodeRegistry::sync_users`].
    ///
    /// The propagation runs on a detached task, so callers on a hot path
    /// never wait on node I/O. Same failure discipline as the awaited
    /// form.
    pub fn sync_users_detached(self: Arc<Self>, users: Vec<NodeUser>) {
        tokio::spawn(async move {
            self.sync_users(users).await;
        });
    }

    /// Push one identity update to every live node.
    pub async fn update_user(&self, user: NodeUser) {
        for (id, node) in self.list().await {
            if let Err(error) = node.update_user(user.clone()).await {
                warn!(node_id = %id, %error, "failed to push user to node");
            }
        }
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
