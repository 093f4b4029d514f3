//! Fleet controller for remote proxy-serving nodes.
//!
//! Each node runs its own proxy core and exposes a small control API;
//! this crate keeps a continuously-reconciled view of every node's
//! health and reacts without letting one slow or failing node stall the
//! others. The moving parts:
//!
//! - [`NodeRegistry`] — concurrent map from node id to live handle,
//!   the source of truth for "who is live"
//! - [`probe`] — bounded liveness verification of one node
//! - [`Reconciler`] — failure/recovery policy with an asymmetric retry
//!   rule (timeout-class faults wait, addressable faults reconnect)
//! - [`FleetSweep`] — concurrent, isolated reconciliation of the fleet
//! - [`LifecycleManager`] — bulk connect at startup, bulk stop at
//!   shutdown, single-node connect/disconnect
//! - [`LimitEnforcer`] — suspends nodes whose traffic allowance is gone
//! - [`FleetController`] — wires it all together
//!
//! The wire protocol ([`NodeClient`]) and persistence ([`NodeStore`])
//! stay behind trait seams.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod limits;
pub mod node;
pub mod probe;
pub mod reconcile;
pub mod runner;
pub mod storage;
pub mod sweep;
pub mod types;

pub use config::FleetConfig;
pub use controller::FleetController;
pub use error::{
    FleetError, FleetResult, NodeError, NodeResult, ProbeError, StorageError, StorageResult,
};
pub use events::{FleetEvent, FleetEvents};
pub use lifecycle::LifecycleManager;
pub use limits::LimitEnforcer;
pub use node::{BackendStats, NodeClient, NodeConnector, NodeRegistry, Versions};
pub use probe::ProbeReport;
pub use reconcile::{decide, Decision, ProbeOutcome, Reconciler};
pub use runner::JobRunner;
pub use storage::{MemoryStore, NodeStore};
pub use sweep::FleetSweep;
pub use types::{
    Health, NodeId, NodeRecord, NodeStatus, NodeUser, StatusUpdate, TransportKind,
};

#[cfg(test)]
pub(crate) mod test_util;
