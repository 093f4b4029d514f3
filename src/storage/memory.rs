//! In-memory storage implementation for development and testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::storage::traits::NodeStore;
use crate::types::{NodeId, NodeRecord, NodeStatus, StatusUpdate};

/// In-memory node store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<NodeId, NodeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn upsert(&self, record: NodeRecord) {
        let mut nodes = self.nodes.write().await;
        nodes.insert(record.id, record);
    }

    /// Delete a record, returning whether it existed.
    pub async fn delete(&self, id: NodeId) -> bool {
        let mut nodes = self.nodes.write().await;
        nodes.remove(&id).is_some()
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn get(&self, id: NodeId) -> StorageResult<Option<NodeRecord>> {
        let nodes = self.nodes.read().await;
        Ok(nodes.get(&id).cloned())
    }

    async fn list_enabled(&self) -> StorageResult<Vec<NodeRecord>> {
        let nodes = self.nodes.read().await;
        Ok(nodes.values().filter(|n| n.enabled).cloned().collect())
    }

    async fn list_over_limit(&self) -> StorageResult<Vec<NodeRecord>> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .values()
            .filter(|n| n.over_limit() && n.status != NodeStatus::Limited)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: NodeId, update: StatusUpdate) -> StorageResult<()> {
        let mut nodes = self.nodes.write().await;
        let record = nodes.get_mut(&id).ok_or(StorageError::NotFound(id))?;

        record.status = update.status;
        record.message = update.message;
        if let Some(node_version) = update.node_version {
            record.node_version = Some(node_version);
        }
        if let Some(core_version) = update.core_version {
            record.core_version = Some(core_version);
        }
        record.updated_at = chrono::Utc::now();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::record;

    #[tokio::test]
    async fn update_status_replaces_message_and_keeps_versions() {
        let store = MemoryStore::new();
        let mut rec = record(1, NodeStatus::Connecting);
        rec.node_version = Some("0.9.0".into());
        store.upsert(rec).await;

        store
            .update_status(NodeId::new(1), StatusUpdate::error("boom"))
            .await
            .unwrap();

        let rec = store.get(NodeId::new(1)).await.unwrap().unwrap();
        assert_eq!(rec.status, NodeStatus::Error);
        assert_eq!(rec.message.as_deref(), Some("boom"));
        assert_eq!(rec.node_version.as_deref(), Some("0.9.0"));

        store
            .update_status(NodeId::new(1), StatusUpdate::connected("1.2.0", "2.5.1"))
            .await
            .unwrap();

        let rec = store.get(NodeId::new(1)).await.unwrap().unwrap();
        assert_eq!(rec.status, NodeStatus::Connected);
        assert_eq!(rec.message, None);
        assert_eq!(rec.node_version.as_deref(), Some("1.2.0"));
        assert_eq!(rec.core_version.as_deref(), Some("2.5.1"));
    }

    #[tokio::test]
    async fn update_status_on_missing_record_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_status(NodeId::new(9), StatusUpdate::to(NodeStatus::Connected))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn over_limit_listing_skips_already_limited() {
        let store = MemoryStore::new();

        let mut a = record(1, NodeStatus::Connected);
        a.used_traffic = 100;
        a.data_limit = Some(100);
        store.upsert(a).await;

        let mut b = record(2, NodeStatus::Limited);
        b.used_traffic = 500;
        b.data_limit = Some(100);
        store.upsert(b).await;

        let mut c = record(3, NodeStatus::Connected);
        c.used_traffic = 50;
        c.data_limit = Some(100);
        store.upsert(c).await;

        let over = store.list_over_limit().await.unwrap();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].id, NodeId::new(1));
    }

    #[tokio::test]
    async fn list_enabled_filters_disabled_records() {
        let store = MemoryStore::new();
        store.upsert(record(1, NodeStatus::Connected)).await;

        let mut off = record(2, NodeStatus::Disabled);
        off.enabled = false;
        store.upsert(off).await;

        let enabled = store.list_enabled().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, NodeId::new(1));
    }
}
