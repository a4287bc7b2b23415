use crate::domain::errors::DomainResult;
use crate::domain::models::{PredictionKind, PredictionRecord};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// Filters for querying predictions
#[derive(Default, Debug, Clone)]
pub struct PredictionFilters {
    pub kind: Option<PredictionKind>,
    pub league: Option<String>,
    pub resolved: Option<bool>,
    pub synced: Option<bool>,
    pub limit: Option<i64>,
}

impl PredictionFilters {
    /// Only unsynced records, unbounded.
    pub fn unsynced() -> Self {
        Self {
            synced: Some(false),
            ..Self::default()
        }
    }

    /// Only unresolved records, bounded to `limit`.
    pub fn unresolved(limit: i64) -> Self {
        Self {
            resolved: Some(false),
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// Derived counts over the stored record set, for the stats surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total: u64,
    pub singles: u64,
    pub multis: u64,
    pub unsynced: u64,
    pub resolved: u64,
    pub correct: u64,
    /// League tag -> record count, most common first.
    pub by_league: Vec<(String, u64)>,
}

/// Repository port for prediction persistence operations
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Insert or replace a record by id
    async fn upsert(&self, record: &PredictionRecord) -> DomainResult<()>;

    /// Get a record by ID; absent ids are Ok(None), not errors
    async fn get(&self, id: Uuid) -> DomainResult<Option<PredictionRecord>>;

    /// List records ordered by created_at descending, with optional filters
    async fn list_recent(&self, filters: PredictionFilters) -> DomainResult<Vec<PredictionRecord>>;

    /// All records awaiting remote acknowledgement, oldest first
    async fn list_unsynced(&self) -> DomainResult<Vec<PredictionRecord>>;

    /// Delete a record by ID; absent ids are PredictionNotFound
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// Remove every record; returns how many were removed
    async fn clear_all(&self) -> DomainResult<u64>;

    /// Count records matching filters
    async fn count(&self, filters: PredictionFilters) -> DomainResult<u64>;

    /// Derived counts for the stats surface
    async fn stats(&self) -> DomainResult<StoreStats>;
}
