use crate::domain::errors::DomainResult;
use crate::domain::models::{GameEvent, PredictionRecord};
use async_trait::async_trait;

/// A page of polled push events plus the cursor to resume from.
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    pub events: Vec<GameEvent>,
    /// Opaque resume position; pass back on the next poll.
    pub cursor: u64,
}

/// Port for the remote prediction service.
///
/// The remote API is an external collaborator; this trait is its full
/// surface as seen from the core. All failures map to transient
/// `NetworkError`s, and the coordinator retries on its next trigger.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Register a newly created record with the remote service
    async fn create(&self, record: &PredictionRecord) -> DomainResult<()>;

    /// Push one record's current state; Ok means acknowledged
    async fn push(&self, record: &PredictionRecord) -> DomainResult<()>;

    /// Fetch the remote-authoritative recent record set
    async fn pull_history(&self, limit: u32) -> DomainResult<Vec<PredictionRecord>>;

    /// Poll for push events newer than `cursor`
    async fn poll_events(&self, cursor: u64) -> DomainResult<EventBatch>;
}
