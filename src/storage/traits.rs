//! Storage trait definition.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{NodeId, NodeRecord, StatusUpdate};

/// CRUD seam over persisted node records.
///
/// Records are owned by storage; the fleet controller only reads them and
/// persists status transitions.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch one node record.
    async fn get(&self, id: NodeId) -> StorageResult<Option<NodeRecord>>;

    /// All records with the enabled flag set.
    async fn list_enabled(&self) -> StorageResult<Vec<NodeRecord>>;

    /// Records whose accounted traffic has reached their allowance and
    /// that are not yet marked limited. The exclusion makes the limit
    /// sweep idempotent by construction.
    async fn list_over_limit(&self) -> StorageResult<Vec<NodeRecord>>;

    /// Persist a status transition on one record.
    async fn update_status(&self, id: NodeId, update: StatusUpdate) -> StorageResult<()>;
}
