//! End-to-end sync flows: offline queueing, the came-online resync,
//! and opportunistic pushes while online.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use tipsheet::domain::models::config::SyncConfig;
use tipsheet::services::{PredictionStore, SyncCoordinator};
use tipsheet::{
    ConnectivityState, ConnectivityTransition, DomainResult, EventBatch, PredictionFactors,
    PredictionRecord, RemoteService,
};

#[derive(Default)]
struct RecordingRemote {
    calls: Mutex<Vec<String>>,
    history: Mutex<Vec<PredictionRecord>>,
}

impl RecordingRemote {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteService for RecordingRemote {
    async fn create(&self, record: &PredictionRecord) -> DomainResult<()> {
        self.calls.lock().unwrap().push(format!("create {}", record.id));
        Ok(())
    }

    async fn push(&self, record: &PredictionRecord) -> DomainResult<()> {
        self.calls.lock().unwrap().push(format!("push {}", record.id));
        Ok(())
    }

    async fn pull_history(&self, _limit: u32) -> DomainResult<Vec<PredictionRecord>> {
        self.calls.lock().unwrap().push("pull".to_string());
        Ok(self.history.lock().unwrap().clone())
    }

    async fn poll_events(&self, _cursor: u64) -> DomainResult<EventBatch> {
        Ok(EventBatch::default())
    }
}

struct Harness {
    store: Arc<PredictionStore>,
    remote: Arc<RecordingRemote>,
    state_tx: watch::Sender<ConnectivityState>,
    transitions_tx: broadcast::Sender<ConnectivityTransition>,
    shutdown_tx: broadcast::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn start() -> Self {
        let store = common::memory_store().await;
        let remote = Arc::new(RecordingRemote::default());

        let (state_tx, state_rx) = watch::channel(ConnectivityState::Offline);
        let (transitions_tx, transitions_rx) = broadcast::channel(8);
        let (shutdown_tx, _) = broadcast::channel(1);

        let coordinator = SyncCoordinator::new(
            store.clone(),
            remote.clone(),
            state_rx,
            SyncConfig::default(),
        );
        let handle = coordinator.start(
            transitions_rx,
            store.subscribe(),
            shutdown_tx.subscribe(),
        );

        Self {
            store,
            remote,
            state_tx,
            transitions_tx,
            shutdown_tx,
            handle,
        }
    }

    fn go_online(&self) {
        self.state_tx.send(ConnectivityState::Online).unwrap();
        self.transitions_tx
            .send(ConnectivityTransition::CameOnline)
            .unwrap();
    }

    async fn wait_for_synced(&self, id: uuid::Uuid) -> PredictionRecord {
        for _ in 0..200 {
            let record = self.store.get(id).await.unwrap().unwrap();
            if record.synced {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("record {id} never became synced");
    }

    async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

fn single(text: &str, probability: f64) -> PredictionFactors {
    PredictionFactors::Single {
        factor_text: text.to_string(),
        probability,
    }
}

#[tokio::test]
async fn test_offline_create_queues_then_came_online_syncs() {
    let harness = Harness::start().await;

    let record = harness
        .store
        .create_record(single("Lakers win", 0.6), 0.8, None)
        .await
        .unwrap();
    assert!(!record.synced);

    // Offline: the coordinator must not have touched the network.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(harness.remote.calls().is_empty());

    harness.go_online();
    let synced = harness.wait_for_synced(record.id).await;
    assert!(synced.synced);

    // Exactly one resync: a pull, then one push for the queued record.
    let calls = harness.remote.calls();
    assert_eq!(calls, vec!["pull".to_string(), format!("push {}", record.id)]);

    harness.stop().await;
}

#[tokio::test]
async fn test_online_create_is_pushed_opportunistically() {
    let harness = Harness::start().await;
    harness.go_online();

    // Let the came-online resync drain first.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let record = harness
        .store
        .create_record(single("Heat cover", 0.5), 0.6, None)
        .await
        .unwrap();

    let synced = harness.wait_for_synced(record.id).await;
    assert!(synced.synced);
    assert!(harness
        .remote
        .calls()
        .contains(&format!("push {}", record.id)));

    harness.stop().await;
}

#[tokio::test]
async fn test_pull_merge_keeps_remote_fields_and_local_log() {
    let harness = Harness::start().await;

    // Local copy with a local-only log line, still unsynced.
    let mut local = PredictionRecord::single("Lakers win", 0.6, 0.8);
    local.log_update("local only note");
    let local = harness.store.put(local).await.unwrap();

    // Remote copy of the same record: resolved, with its own log.
    let mut remote_copy = local.clone();
    remote_copy.synced = true;
    remote_copy.update_log.clear();
    remote_copy.log_update("remote note");
    remote_copy.resolve(true, "Lakers 112-104 Heat").unwrap();
    harness.remote.history.lock().unwrap().push(remote_copy);

    harness.go_online();
    let merged = harness.wait_for_synced(local.id).await;

    // Remote wins the record fields; the local-only log entry survives.
    assert!(merged.resolved);
    assert_eq!(
        merged.resolution.as_ref().map(|r| r.correct),
        Some(true)
    );
    let messages: Vec<&str> = merged
        .update_log
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert!(messages.contains(&"remote note"));
    assert!(messages.contains(&"local only note"));

    harness.stop().await;
}

#[tokio::test]
async fn test_went_offline_stops_pushes() {
    let harness = Harness::start().await;
    harness.go_online();
    tokio::time::sleep(Duration::from_millis(50)).await;

    harness.state_tx.send(ConnectivityState::Offline).unwrap();
    harness
        .transitions_tx
        .send(ConnectivityTransition::WentOffline)
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let calls_before = harness.remote.calls().len();

    let record = harness
        .store
        .create_record(single("Celtics win", 0.7), 0.9, None)
        .await
        .unwrap();
    assert!(!record.synced);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.remote.calls().len(), calls_before);
    let still_queued = harness.store.get(record.id).await.unwrap().unwrap();
    assert!(!still_queued.synced);

    harness.stop().await;
}
