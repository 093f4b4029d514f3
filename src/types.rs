//! Core data model for the node fleet.
//!
//! Two kinds of state live side by side and must not be confused:
//!
//! - [`Health`] is a transient, handle-local classification owned by the
//!   runtime connection wrapper. It is never persisted directly.
//! - [`NodeStatus`] is the durable, operator-visible status on the stored
//!   [`NodeRecord`]. The reconciler derives it from health observations,
//!   so it may lag the live health by up to one sweep cycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a node record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// Transient liveness classification of a live handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Health {
    /// Handle installed but the connection has not been confirmed yet.
    NotConnected,
    /// Handle superseded or torn down; terminal, ignored by reconciliation.
    Invalid,
    /// Last liveness call succeeded.
    Healthy,
    /// Last liveness call failed.
    Broken,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::NotConnected => write!(f, "not_connected"),
            Health::Invalid => write!(f, "invalid"),
            Health::Healthy => write!(f, "healthy"),
            Health::Broken => write!(f, "broken"),
        }
    }
}

/// Durable, operator-visible status of a node record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Handle installed, connection not yet confirmed.
    Connecting,
    /// Last probe confirmed the node healthy.
    Connected,
    /// Last probe failed; a message is attached to the record.
    Error,
    /// Traffic allowance exhausted; cleared only by operator action.
    Limited,
    /// Operator-controlled, outside reconciliation.
    Disabled,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Connecting => write!(f, "connecting"),
            NodeStatus::Connected => write!(f, "connected"),
            NodeStatus::Error => write!(f, "error"),
            NodeStatus::Limited => write!(f, "limited"),
            NodeStatus::Disabled => write!(f, "disabled"),
        }
    }
}

/// Wire transport used for a node's control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Rest,
    Grpc,
}

/// Persisted node record, owned by storage.
///
/// Mutated only through the lifecycle, reconciler, and limit components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,

    pub name: String,

    pub address: String,

    pub port: u16,

    pub transport: TransportKind,

    /// Credential presented to the node's control API.
    pub api_key: String,

    /// PEM bundle for verifying the node's server certificate.
    pub server_ca: Option<String>,

    /// Multiplier applied to reported traffic before accounting.
    pub usage_coefficient: f64,

    pub enabled: bool,

    /// Accounted traffic in bytes.
    pub used_traffic: u64,

    /// Traffic allowance in bytes; `None` means unlimited.
    pub data_limit: Option<u64>,

    pub status: NodeStatus,

    /// Detail attached to the last status transition, if any.
    pub message: Option<String>,

    pub node_version: Option<String>,

    pub core_version: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl NodeRecord {
    /// Whether accounted traffic has reached the allowance.
    pub fn over_limit(&self) -> bool {
        self.data_limit
            .map(|limit| self.used_traffic >= limit)
            .unwrap_or(false)
    }
}

/// A status transition to persist on a node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: NodeStatus,

    /// Replaces the record's message; `None` clears it.
    pub message: Option<String>,

    /// Overwrites the stored node version when present.
    pub node_version: Option<String>,

    /// Overwrites the stored core version when present.
    pub core_version: Option<String>,
}

impl StatusUpdate {
    /// Plain transition with no message or version change.
    pub fn to(status: NodeStatus) -> Self {
        Self {
            status,
            message: None,
            node_version: None,
            core_version: None,
        }
    }

    /// Error transition with an attached message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: NodeStatus::Error,
            message: Some(message.into()),
            node_version: None,
            core_version: None,
        }
    }

    /// Connected transition carrying freshly fetched version strings.
    pub fn connected(node_version: impl Into<String>, core_version: impl Into<String>) -> Self {
        Self {
            status: NodeStatus::Connected,
            message: None,
            node_version: Some(node_version.into()),
            core_version: Some(core_version.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// One entry of the authorized-identity set pushed to every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUser {
    pub id: u64,

    pub username: String,

    /// Credential the proxy core matches incoming traffic against.
    pub key: String,

    /// Inbound tags this user may use on the node.
    pub inbounds: Vec<String>,
}
