//! Control-channel seam for one remote node.
//!
//! The wire protocol lives behind [`NodeClient`]; this crate only assumes
//! an opaque async handle with its own internal retry and backoff. The
//! handle carries an in-memory [`Health`] flag independent of the
//! persisted status on the node record.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::NodeResult;
use crate::types::{Health, NodeRecord, NodeUser};

/// Version strings reported by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versions {
    /// Version of the node's control agent.
    pub node_version: String,

    /// Version of the proxy core the node runs.
    pub core_version: String,
}

/// Statistics reported by the node's proxy core.
///
/// The prober only cares that the call succeeds; the fields are exposed
/// for status reporting upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendStats {
    pub uptime_secs: u64,
    pub connection_count: u64,
}

/// Async control channel to one remote node.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Current in-memory health classification. Fast; no remote round trip.
    async fn health(&self) -> NodeResult<Health>;

    /// Overwrite the in-memory health classification.
    async fn set_health(&self, health: Health) -> NodeResult<()>;

    /// Lightweight liveness call exercising the full control path down to
    /// the proxy core.
    async fn backend_stats(&self) -> NodeResult<BackendStats>;

    /// Fetch node and core version strings.
    async fn versions(&self) -> NodeResult<Versions>;

    /// Whether the handle wants a full reinstall regardless of health.
    fn requires_hard_reset(&self) -> bool;

    /// Best-effort graceful stop.
    async fn stop(&self) -> NodeResult<()>;

    /// Push one authorized identity to the node.
    async fn update_user(&self, user: NodeUser) -> NodeResult<()>;

    /// Replace the node's authorized-identity set.
    async fn sync_users(&self, users: Vec<NodeUser>) -> NodeResult<()>;
}

/// Factory building a client from a persisted node record.
///
/// The returned handle may still be connecting in the background; its
/// health starts at [`Health::NotConnected`] until confirmed.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn connect(&self, record: &NodeRecord) -> NodeResult<Arc<dyn NodeClient>>;
}
