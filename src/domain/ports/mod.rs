//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - PredictionRepository: durable persistence for prediction records
//! - RemoteService: the remote prediction API (push, pull, event poll)
//! - EventTransport: delivery of live push events into the event bus
//! - ConnectivityProbe: the platform online/offline signal
//! - StoreObserver: synchronous store-mutation hook
//!
//! These traits define the contracts that allow the domain to be independent
//! of specific infrastructure implementations.

pub mod connectivity_probe;
pub mod event_transport;
pub mod prediction_repository;
pub mod remote_service;
pub mod store_observer;

pub use connectivity_probe::ConnectivityProbe;
pub use event_transport::EventTransport;
pub use prediction_repository::{PredictionFilters, PredictionRepository, StoreStats};
pub use remote_service::{EventBatch, RemoteService};
pub use store_observer::{StoreChange, StoreObserver};
