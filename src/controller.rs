//! Top-level wiring of the fleet controller.
//!
//! Constructed once at process start and passed to every consumer; no
//! global state. Storage and the node connector stay behind their seams,
//! so the whole controller runs against in-memory fakes in tests.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::FleetConfig;
use crate::error::FleetResult;
use crate::events::{FleetEvent, FleetEvents};
use crate::lifecycle::LifecycleManager;
use crate::limits::LimitEnforcer;
use crate::node::{NodeConnector, NodeRegistry};
use crate::reconcile::Reconciler;
use crate::runner::JobRunner;
use crate::storage::NodeStore;
use crate::sweep::FleetSweep;

/// The assembled node fleet controller.
pub struct FleetController {
    registry: Arc<NodeRegistry>,
    events: FleetEvents,
    lifecycle: Arc<LifecycleManager>,
    sweep: Arc<FleetSweep>,
    limits: Arc<LimitEnforcer>,
    runner: JobRunner,
}

impl FleetController {
    pub fn new(
        store: Arc<dyn NodeStore>,
        connector: Arc<dyn NodeConnector>,
        config: FleetConfig,
    ) -> Self {
        let registry = Arc::new(NodeRegistry::new());
        let events = FleetEvents::new(config.event_buffer);

        let lifecycle = Arc::new(LifecycleManager::new(
            registry.clone(),
            store.clone(),
            connector,
            events.clone(),
            &config,
        ));
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            lifecycle.clone(),
            events.clone(),
            config.clone(),
        ));
        let sweep = Arc::new(FleetSweep::new(
            store.clone(),
            registry.clone(),
            reconciler,
        ));
        let limits = Arc::new(LimitEnforcer::new(store, lifecycle.clone(), events.clone()));
        let runner = JobRunner::new(sweep.clone(), limits.clone(), &config);

        Self {
            registry,
            events,
            lifecycle,
            sweep,
            limits,
            runner,
        }
    }

    /// Connect every enabled node and start the periodic jobs.
    pub async fn start(&self) -> FleetResult<()> {
        self.lifecycle.connect_enabled().await?;
        self.runner.start().await;
        Ok(())
    }

    /// Stop the periodic jobs and every live handle, best-effort.
    pub async fn shutdown(&self) {
        self.runner.stop().await;
        self.lifecycle.stop_all().await;
    }

    /// Subscribe to fleet events.
    pub fn subscribe(&self) -> broadcast::Receiver<FleetEvent> {
        self.events.subscribe()
    }

    /// The live-handle registry, for status reporting upstream.
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// Single-node lifecycle operations, exposed to the operator layer.
    pub fn lifecycle(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle
    }

    /// Trigger one fleet sweep out of band.
    pub fn sweep(&self) -> &Arc<FleetSweep> {
        &self.sweep
    }

    /// Trigger one limit pass out of band.
    pub fn limits(&self) -> &Arc<LimitEnforcer> {
        &self.limits
    }
}
