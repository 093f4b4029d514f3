//! Traffic-allowance enforcement.
//!
//! A slower, independent sweep: storage returns nodes whose accounted
//! traffic has reached their allowance (and that are not yet limited, so
//! a pass is idempotent); each one is disconnected and persisted as
//! limited. The routine status-change event is suppressed in favor of a
//! dedicated limited event carrying the usage figures.

use std::sync::Arc;

use tracing::info;

use crate::error::FleetResult;
use crate::events::{FleetEvent, FleetEvents};
use crate::lifecycle::LifecycleManager;
use crate::storage::NodeStore;
use crate::types::{NodeStatus, StatusUpdate};

/// Suspends nodes whose traffic allowance is exhausted.
pub struct LimitEnforcer {
    store: Arc<dyn NodeStore>,
    lifecycle: Arc<LifecycleManager>,
    events: FleetEvents,
}

impl LimitEnforcer {
    pub fn new(
        store: Arc<dyn NodeStore>,
        lifecycle: Arc<LifecycleManager>,
        events: FleetEvents,
    ) -> Self {
        Self {
            store,
            lifecycle,
            events,
        }
    }

    /// Run one enforcement pass. Returns the number of nodes suspended.
    pub async fn run(&self) -> FleetResult<usize> {
        let exhausted = self.store.list_over_limit().await?;

        for record in &exhausted {
            // Stop traffic first, then persist.
            self.lifecycle.disconnect_single(record.id).await;

            self.store
                .update_status(
                    record.id,
                    StatusUpdate::to(NodeStatus::Limited).with_message("data limit exceeded"),
                )
                .await?;

            self.events.emit(FleetEvent::NodeLimited {
                node_id: record.id,
                name: record.name.clone(),
                used_traffic: record.used_traffic,
                data_limit: record.data_limit.unwrap_or(record.used_traffic),
            });

            info!(
                node_id = %record.id,
                node = %record.name,
                used_traffic = record.used_traffic,
                "node suspended, data limit reached"
            );
        }

        Ok(exhausted.len())
    }
}
