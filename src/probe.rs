//! Bounded liveness verification of one node.
//!
//! A "connected" handle says nothing about the proxy core behind it, so
//! the probe issues a backend-stats call that exercises the full control
//! path: a node whose core crashed is correctly demoted to broken. The
//! whole verification, health read included, runs inside one timeout
//! budget; exceeding it yields [`ProbeError::Timeout`], distinct from
//! every health value.

use std::time::Duration;

use tracing::{debug, error};

use crate::error::{NodeError, ProbeError};
use crate::node::NodeClient;
use crate::types::Health;

/// Outcome of a completed (non-timed-out) verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Health after the verification.
    pub health: Health,

    /// Structured error code, when the liveness call failed with one.
    pub code: Option<i64>,

    /// Failure detail, when the liveness call failed.
    pub message: Option<String>,
}

impl ProbeReport {
    fn healthy() -> Self {
        Self {
            health: Health::Healthy,
            code: None,
            message: None,
        }
    }

    fn skipped(health: Health) -> Self {
        Self {
            health,
            code: None,
            message: None,
        }
    }

    fn broken(code: Option<i64>, message: String) -> Self {
        Self {
            health: Health::Broken,
            code,
            message: Some(message),
        }
    }
}

/// Verify one node's health within `budget`.
pub async fn verify(
    node: &dyn NodeClient,
    name: &str,
    budget: Duration,
) -> Result<ProbeReport, ProbeError> {
    match tokio::time::timeout(budget, verify_inner(node, name)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(budget)),
    }
}

async fn verify_inner(node: &dyn NodeClient, name: &str) -> Result<ProbeReport, ProbeError> {
    let current = node.health().await.map_err(escaped)?;

    // Not-connected and invalid handles are the reconciler's business,
    // not probe failures.
    if matches!(current, Health::NotConnected | Health::Invalid) {
        return Ok(ProbeReport::skipped(current));
    }

    match node.backend_stats().await {
        Ok(_) => {
            if current != Health::Healthy {
                node.set_health(Health::Healthy).await.map_err(escaped)?;
                debug!(node = %name, "node health is healthy");
            }
            Ok(ProbeReport::healthy())
        }
        Err(NodeError::Remote { code, detail }) => {
            error!(node = %name, code, detail = %detail, "liveness call failed, marking node broken");
            match node.set_health(Health::Broken).await {
                Ok(()) => Ok(ProbeReport::broken(Some(code), detail)),
                Err(set_error) => {
                    error!(node = %name, error = %set_error, "failed to mark node broken");
                    Ok(ProbeReport {
                        health: current,
                        code: Some(code),
                        message: Some(detail),
                    })
                }
            }
        }
        Err(NodeError::Transport(message)) => {
            error!(node = %name, error = %message, "liveness call failed, marking node broken");
            match node.set_health(Health::Broken).await {
                Ok(()) => Ok(ProbeReport::broken(None, message)),
                Err(set_error) => {
                    error!(node = %name, error = %set_error, "failed to mark node broken");
                    Ok(ProbeReport {
                        health: current,
                        code: None,
                        message: Some(message),
                    })
                }
            }
        }
    }
}

/// A failure of the health read itself escapes the probe with its
/// classification preserved.
fn escaped(error: NodeError) -> ProbeError {
    match error {
        NodeError::Remote { code, detail } => ProbeError::Remote { code, detail },
        NodeError::Transport(message) => ProbeError::Unclassified(message),
    }
}
