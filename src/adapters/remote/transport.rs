//! Push-event transports feeding the game event bus.
//!
//! The polling transport is the production adapter: it asks the remote
//! for events newer than its cursor on an interval, pausing whenever
//! the connectivity monitor says Offline. The channel transport exists
//! for tests and demos that need to inject events directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ConnectivityState, GameEvent};
use crate::domain::ports::{EventTransport, RemoteService};
use crate::services::event_bus::GameEventBus;

/// Transport that polls `GET /events?since=<cursor>` on an interval.
///
/// Polls happen only while the connectivity cell reads Online; the
/// cursor survives offline stretches, so the next online poll resumes
/// where the last one left off. Poll failures keep the cursor and are
/// retried on the next tick.
pub struct PollingEventTransport {
    remote: Arc<dyn RemoteService>,
    connectivity: watch::Receiver<ConnectivityState>,
    poll_interval: Duration,
}

impl PollingEventTransport {
    pub fn new(
        remote: Arc<dyn RemoteService>,
        connectivity: watch::Receiver<ConnectivityState>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            remote,
            connectivity,
            poll_interval,
        }
    }
}

#[async_trait]
impl EventTransport for PollingEventTransport {
    async fn start(
        &self,
        bus: Arc<GameEventBus>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> DomainResult<JoinHandle<()>> {
        let remote = self.remote.clone();
        let connectivity = self.connectivity.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut cursor: u64 = 0;
            let mut interval = tokio::time::interval(poll_interval);

            // Skip first tick (fires immediately)
            interval.tick().await;

            tracing::info!(
                poll_interval_secs = poll_interval.as_secs_f64(),
                "started event polling transport"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if *connectivity.borrow() != ConnectivityState::Online {
                            continue;
                        }

                        match remote.poll_events(cursor).await {
                            Ok(batch) => {
                                for event in batch.events {
                                    bus.publish(event);
                                }
                                cursor = batch.cursor;
                            }
                            Err(e) => {
                                tracing::warn!(
                                    cursor = cursor,
                                    error = %e,
                                    "event poll failed, will retry on next tick"
                                );
                            }
                        }
                    }

                    _ = shutdown.recv() => {
                        tracing::info!("event polling transport shutting down");
                        break;
                    }
                }
            }
        });

        Ok(handle)
    }
}

/// Transport fed from an in-memory channel.
///
/// `new` hands back the sender half; whatever holds it becomes the
/// event feed. `start` may be called once per transport.
pub struct ChannelEventTransport {
    receiver: Mutex<Option<mpsc::UnboundedReceiver<GameEvent>>>,
}

impl ChannelEventTransport {
    pub fn new() -> (Self, mpsc::UnboundedSender<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl EventTransport for ChannelEventTransport {
    async fn start(
        &self,
        bus: Arc<GameEventBus>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> DomainResult<JoinHandle<()>> {
        let mut receiver = self.receiver.lock().await.take().ok_or_else(|| {
            DomainError::TransportClosed("channel transport already started".to_string())
        })?;

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    maybe_event = receiver.recv() => {
                        match maybe_event {
                            Some(event) => {
                                bus.publish(event);
                            }
                            None => {
                                tracing::info!("channel transport feed closed");
                                break;
                            }
                        }
                    }

                    _ = shutdown.recv() => {
                        tracing::info!("channel transport shutting down");
                        break;
                    }
                }
            }
        });

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::EventBatch;
    use crate::domain::models::PredictionRecord;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Remote stub that serves one event per poll and advances the cursor.
    struct ScriptedRemote {
        polls: AtomicU32,
    }

    impl ScriptedRemote {
        fn new() -> Self {
            Self {
                polls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteService for ScriptedRemote {
        async fn create(&self, _record: &PredictionRecord) -> DomainResult<()> {
            Ok(())
        }

        async fn push(&self, _record: &PredictionRecord) -> DomainResult<()> {
            Ok(())
        }

        async fn pull_history(&self, _limit: u32) -> DomainResult<Vec<PredictionRecord>> {
            Ok(Vec::new())
        }

        async fn poll_events(&self, cursor: u64) -> DomainResult<EventBatch> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(EventBatch {
                events: vec![GameEvent::GameStarted {
                    home: "Lakers".to_string(),
                    away: "Celtics".to_string(),
                }],
                cursor: cursor + 1,
            })
        }
    }

    #[tokio::test]
    async fn test_channel_transport_delivers_into_bus() {
        let bus = Arc::new(GameEventBus::default());
        let mut rx = bus.subscribe();
        let (shutdown_tx, _) = broadcast::channel(1);

        let (transport, feed) = ChannelEventTransport::new();
        let handle = transport
            .start(bus.clone(), shutdown_tx.subscribe())
            .await
            .unwrap();

        feed.send(GameEvent::GameStarted {
            home: "Lakers".to_string(),
            away: "Celtics".to_string(),
        })
        .unwrap();

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.sequence.0, 0);
        assert_eq!(delivered.event.kind(), "game_started");

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_channel_transport_single_start() {
        let bus = Arc::new(GameEventBus::default());
        let (shutdown_tx, _) = broadcast::channel(1);

        let (transport, _feed) = ChannelEventTransport::new();
        let handle = transport
            .start(bus.clone(), shutdown_tx.subscribe())
            .await
            .unwrap();

        let second = transport.start(bus, shutdown_tx.subscribe()).await;
        assert!(matches!(second, Err(DomainError::TransportClosed(_))));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_polling_pauses_while_offline() {
        let remote = Arc::new(ScriptedRemote::new());
        let (state_tx, state_rx) = watch::channel(ConnectivityState::Offline);
        let (shutdown_tx, _) = broadcast::channel(1);

        let bus = Arc::new(GameEventBus::default());
        let mut rx = bus.subscribe();

        let transport =
            PollingEventTransport::new(remote.clone(), state_rx, Duration::from_millis(10));
        let handle = transport
            .start(bus.clone(), shutdown_tx.subscribe())
            .await
            .unwrap();

        // Offline: ticks pass but nothing is polled.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(remote.polls.load(Ordering::SeqCst), 0);

        // Online: polling resumes and events reach the bus.
        state_tx.send(ConnectivityState::Online).unwrap();
        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.event.kind(), "game_started");
        assert!(remote.polls.load(Ordering::SeqCst) >= 1);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
