//! Reconciliation policy: from a health observation to actions.
//!
//! The policy is split in two. [`decide`] is a pure function over closed
//! enums, so every status/health combination is accounted for at compile
//! time and can be tested without any I/O. [`Reconciler::apply`] then
//! performs the storage writes and reconnects the decision calls for.
//!
//! The retry policy is asymmetric: timeout-class faults (a probe timeout,
//! or a structured error with the reserved code `-1`) record an error but
//! never reconnect, to avoid compounding load on a node that is merely
//! slow. A structured error with any other code means the transport
//! answered, so the fault is addressable and a reconnect is worthwhile.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::FleetConfig;
use crate::error::{FleetError, FleetResult, ProbeError};
use crate::events::{FleetEvent, FleetEvents};
use crate::lifecycle::LifecycleManager;
use crate::node::NodeClient;
use crate::probe::{self, ProbeReport};
use crate::storage::NodeStore;
use crate::types::{Health, NodeRecord, NodeStatus, StatusUpdate};

/// Probe outcome as seen by the decision function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The verification exceeded its budget.
    TimedOut,

    /// A structured remote error escaped the probe.
    Failed { code: i64, detail: String },

    /// The verification completed with a report.
    Report(ProbeReport),
}

/// Action chosen for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do.
    Keep,

    /// Persist an error status; optionally reinstall the handle.
    RecordError { message: String, reconnect: bool },

    /// Reinstall the handle without touching persisted status.
    Reconnect,

    /// Fetch version info and persist a connected status.
    ConfirmConnected,
}

/// Decide what to do with one node. First match wins.
pub fn decide(record: &NodeRecord, outcome: &ProbeOutcome, requires_hard_reset: bool) -> Decision {
    let report = match outcome {
        ProbeOutcome::TimedOut => {
            return Decision::RecordError {
                message: "health check timeout".into(),
                reconnect: false,
            }
        }
        ProbeOutcome::Failed { code, detail } => {
            return Decision::RecordError {
                message: detail.clone(),
                reconnect: *code != -1,
            }
        }
        ProbeOutcome::Report(report) => report,
    };

    if report.health == Health::Healthy && record.status == NodeStatus::Connected {
        return Decision::Keep;
    }

    if requires_hard_reset {
        return Decision::Reconnect;
    }

    match report.health {
        Health::Invalid => {
            warn!(node = %record.name, "node health is invalid, ignoring");
            Decision::Keep
        }
        Health::NotConnected => Decision::Reconnect,
        Health::Broken => Decision::RecordError {
            message: report
                .message
                .clone()
                .unwrap_or_else(|| "liveness check failed".into()),
            reconnect: report.code.map(|code| code > -1).unwrap_or(false),
        },
        Health::Healthy => match record.status {
            NodeStatus::Connecting | NodeStatus::Error => Decision::ConfirmConnected,
            // Covered by the first-match rule above; kept for exhaustiveness.
            NodeStatus::Connected => Decision::Keep,
            // Limited is cleared only by operator action.
            NodeStatus::Limited | NodeStatus::Disabled => Decision::Keep,
        },
    }
}

/// Applies the reconciliation policy to single nodes.
pub struct Reconciler {
    store: Arc<dyn NodeStore>,
    lifecycle: Arc<LifecycleManager>,
    events: FleetEvents,
    config: FleetConfig,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn NodeStore>,
        lifecycle: Arc<LifecycleManager>,
        events: FleetEvents,
        config: FleetConfig,
    ) -> Self {
        Self {
            store,
            lifecycle,
            events,
            config,
        }
    }

    /// Probe one node and apply the resulting decision.
    ///
    /// Unclassified probe failures propagate so the caller can isolate
    /// them at the node boundary; everything else is handled here.
    pub async fn reconcile_node(
        &self,
        record: &NodeRecord,
        client: Arc<dyn NodeClient>,
    ) -> FleetResult<()> {
        let outcome =
            match probe::verify(client.as_ref(), &record.name, self.config.probe_timeout).await {
                Ok(report) => ProbeOutcome::Report(report),
                Err(ProbeError::Timeout(_)) => {
                    warn!(node = %record.name, "health check timed out");
                    ProbeOutcome::TimedOut
                }
                Err(ProbeError::Remote { code, detail }) => ProbeOutcome::Failed { code, detail },
                Err(ProbeError::Unclassified(message)) => return Err(FleetError::Probe(message)),
            };

        let decision = decide(record, &outcome, client.requires_hard_reset());
        self.apply(record, client, decision).await
    }

    async fn apply(
        &self,
        record: &NodeRecord,
        client: Arc<dyn NodeClient>,
        decision: Decision,
    ) -> FleetResult<()> {
        match decision {
            Decision::Keep => Ok(()),
            Decision::RecordError { message, reconnect } => {
                self.persist_status(record, StatusUpdate::error(message))
                    .await?;
                if reconnect {
                    self.lifecycle.connect_single(record).await?;
                } else {
                    debug!(node = %record.name, "timeout-class fault, waiting for recovery");
                }
                Ok(())
            }
            Decision::Reconnect => {
                self.lifecycle.connect_single(record).await?;
                Ok(())
            }
            Decision::ConfirmConnected => {
                let versions = client.versions().await?;
                self.persist_status(
                    record,
                    StatusUpdate::connected(versions.node_version, versions.core_version),
                )
                .await?;
                info!(node = %record.name, "node recovered, status is connected");
                Ok(())
            }
        }
    }

    async fn persist_status(&self, record: &NodeRecord, update: StatusUpdate) -> FleetResult<()> {
        self.store.update_status(record.id, update.clone()).await?;
        self.events.emit(FleetEvent::StatusChanged {
            node_id: record.id,
            name: record.name.clone(),
            status: update.status,
            message: update.message,
        });
        Ok(())
    }
}
