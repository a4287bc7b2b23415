//! Offline-first synchronization with the remote prediction service.
//!
//! The coordinator never blocks a local write. It pushes queued records
//! when connectivity allows, pulls the remote-authoritative history on
//! reconnect, and treats every network failure as transient: log it,
//! leave the record queued, retry on the next trigger.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::domain::errors::DomainResult;
use crate::domain::models::config::SyncConfig;
use crate::domain::models::{ConnectivityState, ConnectivityTransition, PredictionRecord};
use crate::domain::ports::RemoteService;
use crate::services::store::{PredictionStore, StoreEvent};

/// Result of one push pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records acknowledged by the remote and marked synced.
    pub pushed: usize,
    /// Records that stayed queued after a failed push.
    pub failed: usize,
}

/// Result of a full resync (one pull, then one push).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ResyncOutcome {
    /// Records merged from the remote history.
    pub pulled: usize,
    pub push: SyncReport,
}

/// Moves records between the local store and the remote service.
#[derive(Clone)]
pub struct SyncCoordinator {
    store: Arc<PredictionStore>,
    remote: Arc<dyn RemoteService>,
    connectivity: watch::Receiver<ConnectivityState>,
    config: SyncConfig,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<PredictionStore>,
        remote: Arc<dyn RemoteService>,
        connectivity: watch::Receiver<ConnectivityState>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            remote,
            connectivity,
            config,
        }
    }

    fn is_online(&self) -> bool {
        self.connectivity.borrow().is_online()
    }

    /// Push every queued (`synced = false`) record to the remote.
    ///
    /// No-op while offline. A failed push leaves its record queued and
    /// the pass continues with the rest.
    pub async fn push_unsynced(&self) -> DomainResult<SyncReport> {
        if !self.is_online() {
            tracing::debug!("skipping push while offline");
            return Ok(SyncReport::default());
        }

        let pending = self.store.list_unsynced().await?;
        if pending.is_empty() {
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        for record in pending {
            match self.remote.push(&record).await {
                Ok(()) => {
                    let mut acked = record;
                    acked.synced = true;
                    match self.store.put(acked).await {
                        Ok(_) => report.pushed += 1,
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to mark pushed record synced");
                            report.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        id = %record.id,
                        error = %e,
                        "push failed, record stays queued"
                    );
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            pushed = report.pushed,
            failed = report.failed,
            "push pass complete"
        );
        Ok(report)
    }

    /// Pull the remote-authoritative history and merge it in.
    ///
    /// The remote wins on every field except the update log, which keeps
    /// local entries the remote lacks. Returns how many records landed.
    pub async fn pull_history(&self, limit: u32) -> DomainResult<usize> {
        if !self.is_online() {
            tracing::debug!("skipping pull while offline");
            return Ok(0);
        }

        let remote_records = self.remote.pull_history(limit).await?;
        let mut merged = 0usize;
        for remote_record in remote_records {
            let local = self.store.get(remote_record.id).await?;
            let record = merge_pulled(remote_record, local.as_ref());
            match self.store.put(record).await {
                Ok(_) => merged += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to store pulled record");
                }
            }
        }

        tracing::info!(merged = merged, "history pull complete");
        Ok(merged)
    }

    /// One pull, then one push, in that order.
    pub async fn full_resync(&self) -> DomainResult<ResyncOutcome> {
        let pulled = self.pull_history(self.config.pull_limit).await?;
        let push = self.push_unsynced().await?;
        Ok(ResyncOutcome { pulled, push })
    }

    /// Spawn the trigger loop until `shutdown` fires.
    ///
    /// Coming online runs a full resync; a local write of an unsynced
    /// record while online runs an opportunistic push pass. Failures
    /// are logged and wait for the next trigger.
    pub fn start(
        &self,
        mut transitions: broadcast::Receiver<ConnectivityTransition>,
        mut store_events: broadcast::Receiver<StoreEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let coordinator = self.clone();

        tokio::spawn(async move {
            tracing::info!("started sync coordinator");

            loop {
                tokio::select! {
                    next = transitions.recv() => match next {
                        Ok(ConnectivityTransition::CameOnline) => {
                            tracing::info!("connectivity restored, running full resync");
                            if let Err(e) = coordinator.full_resync().await {
                                if e.is_transient() {
                                    tracing::warn!(
                                        error = %e,
                                        "resync failed, waiting for the next trigger"
                                    );
                                } else {
                                    tracing::error!(error = %e, "resync failed");
                                }
                            }
                        }
                        Ok(ConnectivityTransition::WentOffline) => {
                            tracing::info!("connectivity lost, queueing local changes");
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                missed = missed,
                                "sync coordinator missed connectivity transitions"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },

                    next = store_events.recv() => match next {
                        Ok(StoreEvent::Put(record)) if !record.synced => {
                            if coordinator.is_online() {
                                if let Err(e) = coordinator.push_unsynced().await {
                                    tracing::warn!(
                                        error = %e,
                                        "opportunistic push failed, record stays queued"
                                    );
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                missed = missed,
                                "sync coordinator missed store events"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },

                    _ = shutdown.recv() => {
                        tracing::info!("sync coordinator shutting down");
                        break;
                    }
                }
            }
        })
    }
}

/// Remote wins on every field except the update log, which appends
/// local entries the remote does not carry (remote entries first,
/// order preserved on both sides).
fn merge_pulled(
    mut remote: PredictionRecord,
    local: Option<&PredictionRecord>,
) -> PredictionRecord {
    if let Some(local) = local {
        let mut log = remote.update_log.clone();
        for entry in &local.update_log {
            if !log.contains(entry) {
                log.push(entry.clone());
            }
        }
        remote.update_log = log;
    }
    remote.synced = true;
    remote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqlitePredictionRepository};
    use crate::domain::errors::DomainError;
    use crate::domain::models::{PredictionFactors, UpdateLogEntry};
    use crate::domain::ports::EventBatch;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Scriptable remote that records call order and can fail pushes
    /// for chosen record ids.
    #[derive(Default)]
    struct RecordingRemote {
        calls: Mutex<Vec<String>>,
        history: Mutex<Vec<PredictionRecord>>,
        fail_push_for: Mutex<Vec<Uuid>>,
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
            if self.fail_push_for.lock().unwrap().contains(&record.id) {
                return Err(DomainError::NetworkError("scripted failure".to_string()));
            }
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

    async fn setup(
        state: ConnectivityState,
    ) -> (
        SyncCoordinator,
        Arc<PredictionStore>,
        Arc<RecordingRemote>,
        watch::Sender<ConnectivityState>,
    ) {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = Arc::new(PredictionStore::new(Arc::new(
            SqlitePredictionRepository::new(pool),
        )));
        let remote = Arc::new(RecordingRemote::default());
        let (state_tx, state_rx) = watch::channel(state);
        let coordinator = SyncCoordinator::new(
            store.clone(),
            remote.clone(),
            state_rx,
            SyncConfig::default(),
        );
        (coordinator, store, remote, state_tx)
    }

    #[tokio::test]
    async fn test_push_marks_acked_records_synced() {
        let (coordinator, store, remote, _state) = setup(ConnectivityState::Online).await;
        let a = store
            .put(PredictionRecord::single("Lakers win", 0.6, 0.8))
            .await
            .unwrap();
        let b = store
            .put(PredictionRecord::single("Heat cover", 0.5, 0.7))
            .await
            .unwrap();

        let report = coordinator.push_unsynced().await.unwrap();

        assert_eq!(report, SyncReport { pushed: 2, failed: 0 });
        assert!(store.list_unsynced().await.unwrap().is_empty());
        let calls = remote.calls();
        assert!(calls.contains(&format!("push {}", a.id)));
        assert!(calls.contains(&format!("push {}", b.id)));
    }

    #[tokio::test]
    async fn test_push_is_noop_while_offline() {
        let (coordinator, store, remote, _state) = setup(ConnectivityState::Offline).await;
        store
            .put(PredictionRecord::single("Lakers win", 0.6, 0.8))
            .await
            .unwrap();

        let report = coordinator.push_unsynced().await.unwrap();

        assert_eq!(report, SyncReport::default());
        assert!(remote.calls().is_empty());
        assert_eq!(store.list_unsynced().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_continues_past_a_failing_record() {
        let (coordinator, store, remote, _state) = setup(ConnectivityState::Online).await;
        let failing = store
            .put(PredictionRecord::single("Lakers win", 0.6, 0.8))
            .await
            .unwrap();
        store
            .put(PredictionRecord::single("Heat cover", 0.5, 0.7))
            .await
            .unwrap();
        remote.fail_push_for.lock().unwrap().push(failing.id);

        let report = coordinator.push_unsynced().await.unwrap();

        assert_eq!(report, SyncReport { pushed: 1, failed: 1 });
        let still_queued = store.list_unsynced().await.unwrap();
        assert_eq!(still_queued.len(), 1);
        assert_eq!(still_queued[0].id, failing.id);
    }

    #[tokio::test]
    async fn test_pull_inserts_new_remote_records_as_synced() {
        let (coordinator, store, remote, _state) = setup(ConnectivityState::Online).await;
        let mut incoming = PredictionRecord::single("Celtics win", 0.55, 0.8);
        incoming.synced = true;
        remote.history.lock().unwrap().push(incoming.clone());

        let merged = coordinator.pull_history(100).await.unwrap();

        assert_eq!(merged, 1);
        let stored = store.get(incoming.id).await.unwrap().unwrap();
        assert!(stored.synced);
        assert_eq!(stored.combined_probability(), 0.55);
    }

    #[tokio::test]
    async fn test_pull_remote_wins_except_update_log() {
        let (coordinator, store, remote, _state) = setup(ConnectivityState::Online).await;

        let mut local = PredictionRecord::single("Lakers win", 0.60, 0.8);
        local.log_update("local only note");
        let local = store.put(local).await.unwrap();

        let mut from_remote = local.clone();
        from_remote.factors = PredictionFactors::Single {
            factor_text: "Lakers win".to_string(),
            probability: 0.50,
        };
        from_remote.update_log = vec![UpdateLogEntry::new("remote note")];
        remote.history.lock().unwrap().push(from_remote);

        coordinator.pull_history(100).await.unwrap();

        let stored = store.get(local.id).await.unwrap().unwrap();
        assert_eq!(stored.combined_probability(), 0.50);
        assert!(stored.synced);
        let messages: Vec<&str> = stored
            .update_log
            .iter()
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(messages, vec!["remote note", "local only note"]);
    }

    #[tokio::test]
    async fn test_full_resync_pulls_once_then_pushes() {
        let (coordinator, store, remote, _state) = setup(ConnectivityState::Online).await;
        let queued = store
            .put(PredictionRecord::single("Lakers win", 0.6, 0.8))
            .await
            .unwrap();

        let outcome = coordinator.full_resync().await.unwrap();

        assert_eq!(outcome.push.pushed, 1);
        assert_eq!(
            remote.calls(),
            vec!["pull".to_string(), format!("push {}", queued.id)]
        );
    }

    #[test]
    fn test_merge_without_local_marks_synced() {
        let mut remote = PredictionRecord::single("Lakers win", 0.6, 0.8);
        remote.synced = false;

        let merged = merge_pulled(remote, None);
        assert!(merged.synced);
        assert!(merged.update_log.is_empty());
    }

    #[test]
    fn test_merge_skips_duplicate_log_entries() {
        let mut remote = PredictionRecord::single("Lakers win", 0.6, 0.8);
        let shared = UpdateLogEntry::new("shared entry");
        remote.update_log = vec![shared.clone()];

        let mut local = remote.clone();
        local.update_log = vec![shared, UpdateLogEntry::new("local extra")];

        let merged = merge_pulled(remote, Some(&local));
        let messages: Vec<&str> = merged
            .update_log
            .iter()
            .map(|entry| entry.message.as_str())
            .collect();
        assert_eq!(messages, vec!["shared entry", "local extra"]);
    }
}
