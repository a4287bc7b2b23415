//! Tipsheet - Offline-first sports prediction tracker
//!
//! Tipsheet keeps a local store of sports predictions (singles and
//! parlays), reconciles them against live game events, and syncs with
//! a remote dashboard service whenever connectivity allows. Local
//! writes always succeed; the network only ever affects the `synced`
//! flag on a record.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Prediction models, game events, ports
//! - **Service Layer** (`services`): Store, sync, reconciliation, runtime
//! - **Adapters** (`adapters`): SQLite persistence and the remote HTTP client
//! - **Infrastructure Layer** (`infrastructure`): Config loading and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tipsheet::adapters::sqlite::{initialize_database, SqlitePredictionRepository};
//! use tipsheet::domain::models::Config;
//! use tipsheet::services::PredictionStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let pool = initialize_database(&config.database.database_url()).await?;
//!     let store = PredictionStore::new(Arc::new(SqlitePredictionRepository::new(pool)));
//!     let record = store
//!         .create_record(
//!             tipsheet::domain::models::PredictionFactors::Single {
//!                 factor_text: "Lakers win".into(),
//!                 probability: 0.6,
//!             },
//!             0.8,
//!             Some("nba".into()),
//!         )
//!         .await?;
//!     println!("{}", record.id);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, ConnectivityState, ConnectivityTransition, GameEvent, PlayerStatus, PredictionFactors,
    PredictionKind, PredictionLeg, PredictionRecord, Resolution, UpdateLogEntry,
};
pub use domain::ports::{
    ConnectivityProbe, EventBatch, EventTransport, PredictionFilters, PredictionRepository,
    RemoteService, StoreChange, StoreObserver, StoreStats,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    DashboardRuntime, GameEventBus, PredictionStore, ReconciliationEngine, SyncCoordinator,
};
