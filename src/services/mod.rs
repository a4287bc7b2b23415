pub mod connectivity;
pub mod event_bus;
pub mod projector;
pub mod reconciliation;
pub mod runtime;
pub mod store;
pub mod sync;

pub use connectivity::ConnectivityMonitor;
pub use event_bus::{GameEventBus, SequenceNumber, SequencedEvent};
pub use projector::CurrentViewProjector;
pub use reconciliation::ReconciliationEngine;
pub use runtime::DashboardRuntime;
pub use store::{PredictionStore, StoreEvent};
pub use sync::{ResyncOutcome, SyncCoordinator, SyncReport};
