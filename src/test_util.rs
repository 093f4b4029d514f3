//! Shared fixtures: a scriptable in-memory node client and connector.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{NodeError, NodeResult};
use crate::node::{BackendStats, NodeClient, NodeConnector, Versions};
use crate::types::{Health, NodeId, NodeRecord, NodeStatus, NodeUser, TransportKind};

/// Install a fmt subscriber for test runs; later calls are no-ops.
///
/// Run with `RUST_LOG=proxy_fleet=trace` to see the controller's output
/// in failing tests.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxy_fleet=debug".into()),
        )
        .without_time()
        .with_test_writer()
        .try_init();
}

/// Scriptable [`NodeClient`]: failures and delays are injected per call,
/// calls are counted. Plain mutexes guard the scripted state; none are
/// held across an await.
pub(crate) struct MockNode {
    health: Mutex<Health>,
    versions: Mutex<Versions>,
    synced: Mutex<Vec<NodeUser>>,

    health_error: Mutex<Option<NodeError>>,
    stats_error: Mutex<Option<NodeError>>,
    health_delay: Mutex<Option<Duration>>,
    stats_delay: Mutex<Option<Duration>>,
    stop_delay: Mutex<Option<Duration>>,
    set_health_fails: AtomicBool,
    stop_fails: AtomicBool,
    user_updates_fail: AtomicBool,

    set_health_calls: AtomicUsize,
    stats_call_count: AtomicUsize,
    stop_calls: AtomicUsize,
}

impl MockNode {
    pub(crate) fn with_health(health: Health) -> Arc<Self> {
        Arc::new(Self {
            health: Mutex::new(health),
            versions: Mutex::new(Versions {
                node_version: "0.0.0".into(),
                core_version: "0.0.0".into(),
            }),
            synced: Mutex::new(Vec::new()),
            health_error: Mutex::new(None),
            stats_error: Mutex::new(None),
            health_delay: Mutex::new(None),
            stats_delay: Mutex::new(None),
            stop_delay: Mutex::new(None),
            set_health_fails: AtomicBool::new(false),
            stop_fails: AtomicBool::new(false),
            user_updates_fail: AtomicBool::new(false),
            set_health_calls: AtomicUsize::new(0),
            stats_call_count: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn healthy() -> Arc<Self> {
        Self::with_health(Health::Healthy)
    }

    pub(crate) fn fail_health_with(&self, error: NodeError) {
        *self.health_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_stats_with(&self, error: NodeError) {
        *self.stats_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fail_set_health(&self) {
        self.set_health_fails.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_stop(&self) {
        self.stop_fails.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_user_updates(&self) {
        self.user_updates_fail.store(true, Ordering::SeqCst);
    }

    pub(crate) fn delay_health(&self, delay: Duration) {
        *self.health_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn delay_stats(&self, delay: Duration) {
        *self.stats_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn delay_stop(&self, delay: Duration) {
        *self.stop_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) async fn set_versions(&self, node_version: &str, core_version: &str) {
        *self.versions.lock().unwrap() = Versions {
            node_version: node_version.into(),
            core_version: core_version.into(),
        };
    }

    pub(crate) async fn current_health(&self) -> Health {
        *self.health.lock().unwrap()
    }

    pub(crate) async fn synced_users(&self) -> Vec<NodeUser> {
        self.synced.lock().unwrap().clone()
    }

    pub(crate) fn set_health_count(&self) -> usize {
        self.set_health_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn stats_calls(&self) -> usize {
        self.stats_call_count.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn health(&self) -> NodeResult<Health> {
        let delay = *self.health_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.health_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(*self.health.lock().unwrap())
    }

    async fn set_health(&self, health: Health) -> NodeResult<()> {
        if self.set_health_fails.load(Ordering::SeqCst) {
            return Err(NodeError::Transport("set_health refused".into()));
        }
        self.set_health_calls.fetch_add(1, Ordering::SeqCst);
        *self.health.lock().unwrap() = health;
        Ok(())
    }

    async fn backend_stats(&self) -> NodeResult<BackendStats> {
        self.stats_call_count.fetch_add(1, Ordering::SeqCst);
        let delay = *self.stats_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.stats_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(BackendStats::default())
    }

    async fn versions(&self) -> NodeResult<Versions> {
        Ok(self.versions.lock().unwrap().clone())
    }

    fn requires_hard_reset(&self) -> bool {
        false
    }

    async fn stop(&self) -> NodeResult<()> {
        let delay = *self.stop_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.stop_fails.load(Ordering::SeqCst) {
            return Err(NodeError::Transport("stop refused".into()));
        }
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_user(&self, user: NodeUser) -> NodeResult<()> {
        if self.user_updates_fail.load(Ordering::SeqCst) {
            return Err(NodeError::Transport("update_user refused".into()));
        }
        self.synced.lock().unwrap().push(user);
        Ok(())
    }

    async fn sync_users(&self, users: Vec<NodeUser>) -> NodeResult<()> {
        if self.user_updates_fail.load(Ordering::SeqCst) {
            return Err(NodeError::Transport("sync_users refused".into()));
        }
        *self.synced.lock().unwrap() = users;
        Ok(())
    }
}

/// Connector handing out fresh [`MockNode`]s, with per-id failure
/// injection.
pub(crate) struct MockConnector {
    connects: AtomicUsize,
    failing: Mutex<HashSet<NodeId>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self {
            connects: AtomicUsize::new(0),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Refuse future connects for `id`.
    pub(crate) async fn fail_for(&self, id: NodeId) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Number of successful connects so far.
    pub(crate) fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeConnector for MockConnector {
    async fn connect(&self, record: &NodeRecord) -> NodeResult<Arc<dyn NodeClient>> {
        if self.failing.lock().unwrap().contains(&record.id) {
            return Err(NodeError::Transport("connect refused".into()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MockNode::with_health(Health::NotConnected))
    }
}

/// An enabled node record with sensible defaults.
pub(crate) fn record(id: u64, status: NodeStatus) -> NodeRecord {
    let now = Utc::now();
    NodeRecord {
        id: NodeId::new(id),
        name: format!("edge-{id}"),
        address: format!("10.0.0.{id}"),
        port: 62050,
        transport: TransportKind::Grpc,
        api_key: "test-key".into(),
        server_ca: None,
        usage_coefficient: 1.0,
        enabled: true,
        used_traffic: 0,
        data_limit: None,
        status,
        message: None,
        node_version: None,
        core_version: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn user(id: u64, username: &str) -> NodeUser {
    NodeUser {
        id,
        username: username.into(),
        key: format!("key-{id}"),
        inbounds: vec!["vless-tcp".into()],
    }
}
