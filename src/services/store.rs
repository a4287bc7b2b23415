//! Prediction store service.
//!
//! Wraps the repository port and adds the change-notification side
//! effect: every successful write first awaits each registered
//! observer, then broadcasts a [`StoreEvent`] for loosely-coupled
//! listeners. Observers run before the write call returns, so a
//! displayed record can never go stale behind a mutation.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PredictionFactors, PredictionRecord};
use crate::domain::ports::{
    PredictionFilters, PredictionRepository, StoreChange, StoreObserver, StoreStats,
};

/// Capacity of the store's broadcast channel.
const STORE_EVENT_CAPACITY: usize = 256;

/// Change notification broadcast to store subscribers.
///
/// Same payloads as [`StoreChange`]; this is the owned, cloneable
/// envelope that travels the broadcast channel, while `StoreChange` is
/// the by-reference argument of the synchronous observer hook.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A record was created or overwritten.
    Put(PredictionRecord),
    /// A record was removed.
    Deleted(Uuid),
    /// The whole store was emptied.
    Cleared,
}

impl From<&StoreChange> for StoreEvent {
    fn from(change: &StoreChange) -> Self {
        match change {
            StoreChange::Put(record) => Self::Put(record.clone()),
            StoreChange::Deleted(id) => Self::Deleted(*id),
            StoreChange::Cleared => Self::Cleared,
        }
    }
}

/// Facade over the prediction repository.
///
/// All writes validate first and never clamp; out-of-range numbers are
/// rejected, since only the reconciliation transforms are allowed to
/// adjust probabilities.
pub struct PredictionStore {
    repo: Arc<dyn PredictionRepository>,
    observers: RwLock<Vec<Arc<dyn StoreObserver>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl PredictionStore {
    pub fn new(repo: Arc<dyn PredictionRepository>) -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Self {
            repo,
            observers: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Register an observer to be awaited on every write.
    pub async fn register_observer(&self, observer: Arc<dyn StoreObserver>) {
        self.observers.write().await.push(observer);
    }

    /// Subscribe to the change broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Create and persist a new record from a draft payload.
    ///
    /// Assigns the id and creation timestamp; starts unsynced.
    pub async fn create_record(
        &self,
        factors: PredictionFactors,
        confidence: f64,
        league: Option<String>,
    ) -> DomainResult<PredictionRecord> {
        let mut record = PredictionRecord::from_factors(factors, confidence);
        if let Some(league) = league {
            record = record.with_league(league);
        }

        record.validate().map_err(DomainError::ValidationFailed)?;
        self.repo.upsert(&record).await?;

        tracing::info!(
            id = %record.id,
            kind = record.kind().as_str(),
            combined_probability = record.combined_probability(),
            "created prediction record"
        );

        self.notify(StoreChange::Put(record.clone())).await;
        Ok(record)
    }

    /// Validate and persist a full record (create or overwrite by id).
    pub async fn put(&self, record: PredictionRecord) -> DomainResult<PredictionRecord> {
        record.validate().map_err(DomainError::ValidationFailed)?;
        self.repo.upsert(&record).await?;
        self.notify(StoreChange::Put(record.clone())).await;
        Ok(record)
    }

    /// Fetch one record; absent ids are `Ok(None)`.
    pub async fn get(&self, id: Uuid) -> DomainResult<Option<PredictionRecord>> {
        self.repo.get(id).await
    }

    /// List records, newest first, honoring the filters.
    pub async fn list_recent(
        &self,
        filters: PredictionFilters,
    ) -> DomainResult<Vec<PredictionRecord>> {
        self.repo.list_recent(filters).await
    }

    /// All records awaiting remote acknowledgement, oldest first.
    pub async fn list_unsynced(&self) -> DomainResult<Vec<PredictionRecord>> {
        self.repo.list_unsynced().await
    }

    /// Delete one record; absent ids error with `PredictionNotFound`.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(id = %id, "deleted prediction record");
        self.notify(StoreChange::Deleted(id)).await;
        Ok(())
    }

    /// Remove every record; returns how many were removed.
    pub async fn clear_all(&self) -> DomainResult<u64> {
        let removed = self.repo.clear_all().await?;
        tracing::info!(removed = removed, "cleared prediction store");
        self.notify(StoreChange::Cleared).await;
        Ok(removed)
    }

    /// Count records matching the filters.
    pub async fn count(&self, filters: PredictionFilters) -> DomainResult<u64> {
        self.repo.count(filters).await
    }

    /// Derived counts for the stats surface.
    pub async fn stats(&self) -> DomainResult<StoreStats> {
        self.repo.stats().await
    }

    /// Await observers, then broadcast. Broadcast errors mean no
    /// subscribers and are ignored.
    async fn notify(&self, change: StoreChange) {
        {
            let observers = self.observers.read().await;
            for observer in observers.iter() {
                observer.on_change(&change).await;
            }
        }
        let _ = self.events.send(StoreEvent::from(&change));
    }
}
