//! Fleet controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the fleet controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Budget for one node's health verification. Covers both the health
    /// read and the liveness call that follows it.
    pub probe_timeout: Duration,

    /// Interval between fleet health sweeps.
    pub health_check_interval: Duration,

    /// Interval between traffic-limit sweeps. Independent of, and slower
    /// than, the health sweep.
    pub limit_check_interval: Duration,

    /// Per-node budget for a graceful stop at shutdown.
    pub stop_timeout: Duration,

    /// Capacity of the fleet event channel.
    pub event_buffer: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
            health_check_interval: Duration::from_secs(30),
            limit_check_interval: Duration::from_secs(120),
            stop_timeout: Duration::from_secs(5),
            event_buffer: 1024,
        }
    }
}
