//! Periodic job loops driving the sweeps.
//!
//! Two independent interval loops: a frequent fleet health sweep and a
//! slower limit sweep. Missed ticks are skipped (coalescing), and the
//! sweep's own single-in-flight guard drops overlapping triggers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::config::FleetConfig;
use crate::limits::LimitEnforcer;
use crate::sweep::FleetSweep;

/// Spawns and owns the periodic fleet jobs.
pub struct JobRunner {
    sweep: Arc<FleetSweep>,
    limits: Arc<LimitEnforcer>,
    health_check_interval: Duration,
    limit_check_interval: Duration,
    running: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl JobRunner {
    pub fn new(sweep: Arc<FleetSweep>, limits: Arc<LimitEnforcer>, config: &FleetConfig) -> Self {
        Self {
            sweep,
            limits,
            health_check_interval: config.health_check_interval,
            limit_check_interval: config.limit_check_interval,
            running: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start both job loops. Idempotent while running.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            health_interval_secs = self.health_check_interval.as_secs(),
            limit_interval_secs = self.limit_check_interval.as_secs(),
            "starting fleet jobs"
        );

        let sweep = self.sweep.clone();
        let running = self.running.clone();
        let every = self.health_check_interval;
        let health_task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(err) = sweep.run().await {
                    error!(error = %err, "fleet sweep failed");
                }
            }
        });

        let limits = self.limits.clone();
        let running = self.running.clone();
        let every = self.limit_check_interval;
        let limit_task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(err) = limits.run().await {
                    error!(error = %err, "limit sweep failed");
                }
            }
        });

        let mut tasks = self.tasks.lock().await;
        tasks.push(health_task);
        tasks.push(limit_task);
    }

    /// Stop the job loops. Safe to call more than once.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        info!("stopping fleet jobs");
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
