//! Error types for the fleet controller.
//!
//! The taxonomy mirrors how failures are acted on, not where they came
//! from: a structured remote error carries a code that decides whether a
//! reconnect is worthwhile, a probe timeout is distinguished from every
//! health value, and teardown failures are always swallowed and logged.

use thiserror::Error;

use crate::types::NodeId;

/// Failure reported by a remote node's control channel.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// Structured remote failure. Code `-1` is reserved for timeout-class
    /// conditions inside the node; any other code is addressable.
    #[error("remote error (code {code}): {detail}")]
    Remote { code: i64, detail: String },

    /// Unstructured transport or protocol failure, reduced to a message.
    #[error("transport error: {0}")]
    Transport(String),
}

impl NodeError {
    /// The structured error code, if this failure carries one.
    pub fn code(&self) -> Option<i64> {
        match self {
            NodeError::Remote { code, .. } => Some(*code),
            NodeError::Transport(_) => None,
        }
    }
}

/// Result type for node control-channel operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Failure of a single health verification.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    /// The verification did not complete within its budget.
    #[error("health check timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A structured remote error escaped the probe.
    #[error("health check failed (code {code}): {detail}")]
    Remote { code: i64, detail: String },

    /// An unstructured error escaped the probe; handled at the node
    /// boundary by the sweep, never classified.
    #[error("health check failed: {0}")]
    Unclassified(String),
}

/// Failure in the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Top-level error for fleet operations.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("health check failed: {0}")]
    Probe(String),
}

/// Result type for fleet operations.
pub type FleetResult<T> = Result<T, FleetError>;
