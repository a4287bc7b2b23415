//! Runtime assembly and lifecycle.
//!
//! [`DashboardRuntime`] is the explicitly constructed service object
//! that owns the store, the connectivity monitor, and the background
//! loop handles. Construction wires everything together but spawns
//! nothing; `start` and `stop` are the whole lifecycle. There is no
//! process-global state anywhere.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::domain::errors::DomainResult;
use crate::domain::models::Config;
use crate::domain::ports::{EventTransport, RemoteService};
use crate::services::connectivity::ConnectivityMonitor;
use crate::services::event_bus::{EventBusConfig, GameEventBus};
use crate::services::projector::CurrentViewProjector;
use crate::services::reconciliation::ReconciliationEngine;
use crate::services::store::PredictionStore;
use crate::services::sync::SyncCoordinator;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuntimeState {
    Stopped,
    Running,
}

/// Owns the wired components and their background tasks.
pub struct DashboardRuntime {
    store: Arc<PredictionStore>,
    monitor: Arc<ConnectivityMonitor>,
    coordinator: SyncCoordinator,
    engine: ReconciliationEngine,
    projector: Arc<CurrentViewProjector>,
    bus: Arc<GameEventBus>,
    transport: Arc<dyn EventTransport>,
    shutdown_tx: broadcast::Sender<()>,
    state: RwLock<RuntimeState>,
    handles: RwLock<Vec<JoinHandle<()>>>,
}

impl DashboardRuntime {
    /// Wire the components against the given port implementations.
    ///
    /// The monitor comes in pre-built because the transport usually
    /// holds its state receiver. Registers the projector as a store
    /// observer; spawns nothing until [`start`](Self::start).
    pub async fn new(
        store: Arc<PredictionStore>,
        remote: Arc<dyn RemoteService>,
        monitor: Arc<ConnectivityMonitor>,
        transport: Arc<dyn EventTransport>,
        config: &Config,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);
        let bus = Arc::new(GameEventBus::new(EventBusConfig {
            channel_capacity: config.events.channel_capacity,
        }));
        let coordinator = SyncCoordinator::new(
            store.clone(),
            remote,
            monitor.state(),
            config.sync.clone(),
        );
        let engine = ReconciliationEngine::new(store.clone(), config.reconciliation.clone());
        let projector = Arc::new(CurrentViewProjector::new());
        store.register_observer(projector.clone()).await;

        Self {
            store,
            monitor,
            coordinator,
            engine,
            projector,
            bus,
            transport,
            shutdown_tx,
            state: RwLock::new(RuntimeState::Stopped),
            handles: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<PredictionStore> {
        &self.store
    }

    pub fn projector(&self) -> &Arc<CurrentViewProjector> {
        &self.projector
    }

    pub fn bus(&self) -> &Arc<GameEventBus> {
        &self.bus
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub async fn is_running(&self) -> bool {
        *self.state.read().await == RuntimeState::Running
    }

    /// Spawn the background loops: connectivity monitor, event
    /// transport, reconciliation engine, sync coordinator.
    ///
    /// Idempotent while running. The engine subscribes to the bus
    /// before the transport starts delivering, so no event published
    /// after this returns can be missed.
    pub async fn start(&self) -> DomainResult<()> {
        let mut state = self.state.write().await;
        if *state == RuntimeState::Running {
            return Ok(());
        }

        tracing::info!("starting dashboard runtime");

        let mut handles = Vec::new();
        handles.push(self.monitor.start(self.shutdown_tx.subscribe()));
        handles.push(self.engine.start(&self.bus, self.shutdown_tx.subscribe()));
        handles.push(
            self.transport
                .start(self.bus.clone(), self.shutdown_tx.subscribe())
                .await?,
        );
        handles.push(self.coordinator.start(
            self.monitor.transitions(),
            self.store.subscribe(),
            self.shutdown_tx.subscribe(),
        ));

        *self.handles.write().await = handles;
        *state = RuntimeState::Running;
        tracing::info!("dashboard runtime started");
        Ok(())
    }

    /// Broadcast shutdown and wait for every background task under a
    /// bounded timeout. Idempotent while stopped.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if *state == RuntimeState::Stopped {
            return;
        }

        tracing::info!("stopping dashboard runtime");
        let _ = self.shutdown_tx.send(());

        let handles = std::mem::take(&mut *self.handles.write().await);
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, futures::future::join_all(handles)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        tracing::warn!(error = ?e, "background task ended abnormally");
                    }
                }
            }
            Err(_) => {
                tracing::warn!("background tasks did not stop within the timeout");
            }
        }

        *state = RuntimeState::Stopped;
        tracing::info!("dashboard runtime stopped");
    }
}
