use crate::domain::models::PredictionRecord;
use async_trait::async_trait;
use uuid::Uuid;

/// A change that just happened to the record store.
#[derive(Debug, Clone)]
pub enum StoreChange {
    /// A record was created or overwritten.
    Put(PredictionRecord),
    /// A record was removed.
    Deleted(Uuid),
    /// The whole store was emptied.
    Cleared,
}

impl StoreChange {
    /// Id of the affected record, if the change names one.
    pub fn record_id(&self) -> Option<Uuid> {
        match self {
            Self::Put(record) => Some(record.id),
            Self::Deleted(id) => Some(*id),
            Self::Cleared => None,
        }
    }
}

/// Observer hook fired by the store after every successful write,
/// before the write call returns to its caller. The current-view
/// projector registers here so a displayed record can never go stale
/// behind a mutation.
#[async_trait]
pub trait StoreObserver: Send + Sync {
    /// React to a store change
    async fn on_change(&self, change: &StoreChange);
}
