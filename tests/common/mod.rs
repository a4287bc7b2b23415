//! Common test utilities for integration tests.

use std::sync::Arc;

use tipsheet::adapters::sqlite::{create_migrated_test_pool, SqlitePredictionRepository};
use tipsheet::services::PredictionStore;

/// In-memory prediction store with all migrations applied.
pub async fn memory_store() -> Arc<PredictionStore> {
    let pool = create_migrated_test_pool()
        .await
        .expect("Failed to create test pool");
    Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )))
}
