use crate::domain::errors::DomainResult;
use crate::services::event_bus::GameEventBus;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Port for the push-event transport.
///
/// A transport's only job is to publish feed events into the shared
/// event bus while the process wants them. Reconnect-on-drop is the
/// transport's own responsibility; the connectivity monitor merely
/// gates whether it should be delivering at all.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Start delivering events into `bus` until `shutdown` fires
    async fn start(
        &self,
        bus: Arc<GameEventBus>,
        shutdown: broadcast::Receiver<()>,
    ) -> DomainResult<JoinHandle<()>>;
}
