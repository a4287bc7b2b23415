//! Game event bus for live push-event distribution.
//!
//! Provides a broadcast-based event stream with sequence numbering.
//! Transports publish into the bus; the reconciliation engine and the
//! watch display subscribe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

use crate::domain::models::GameEvent;

/// Monotonically increasing sequence number assigned by the bus.
///
/// Local to this process; the remote poll cursor is a separate,
/// server-assigned position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(pub u64);

impl std::fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Envelope the bus broadcasts: the event plus its local ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub sequence: SequenceNumber,
    /// When this process first saw the event.
    pub received_at: DateTime<Utc>,
    pub event: GameEvent,
}

/// Configuration for the event bus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for the broadcast channel.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Central bus broadcasting game events to multiple consumers.
///
/// Consumers see events in publish order; a slow subscriber that falls
/// more than `channel_capacity` behind observes a `Lagged` error from
/// its receiver, not backpressure on publishers.
pub struct GameEventBus {
    sender: broadcast::Sender<SequencedEvent>,
    sequence: AtomicU64,
}

impl GameEventBus {
    /// Create a new bus with the given configuration.
    pub fn new(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity);
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    /// Publish one event, assigning it the next sequence number.
    ///
    /// Returns the assigned number. Send errors are ignored; a bus with
    /// no subscribers simply drops the event.
    pub fn publish(&self, event: GameEvent) -> SequenceNumber {
        let seq = SequenceNumber(self.sequence.fetch_add(1, Ordering::SeqCst));
        let envelope = SequencedEvent {
            sequence: seq,
            received_at: Utc::now(),
            event,
        };

        tracing::debug!(
            sequence = seq.0,
            kind = envelope.event.kind(),
            "publishing game event"
        );

        let _ = self.sender.send(envelope);
        seq
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.sender.subscribe()
    }

    /// Next sequence number that would be assigned.
    pub fn current_sequence(&self) -> SequenceNumber {
        SequenceNumber(self.sequence.load(Ordering::SeqCst))
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for GameEventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(home: &str, away: &str) -> GameEvent {
        GameEvent::GameStarted {
            home: home.to_string(),
            away: away.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sequence_assignment() {
        let bus = GameEventBus::default();
        assert_eq!(bus.current_sequence().0, 0);

        let mut rx = bus.subscribe();

        bus.publish(started("Lakers", "Celtics"));
        let first = rx.recv().await.unwrap();
        assert_eq!(first.sequence.0, 0);

        bus.publish(started("Heat", "Knicks"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.sequence.0, 1);

        assert_eq!(bus.current_sequence().0, 2);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = GameEventBus::default();
        assert_eq!(bus.subscriber_count(), 0);

        // No receiver exists; the event is dropped, not an error.
        let seq = bus.publish(started("Lakers", "Celtics"));
        assert_eq!(seq.0, 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_see_same_order() {
        let bus = GameEventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(started("Lakers", "Celtics"));
        bus.publish(GameEvent::GameFinal {
            home: "Lakers".into(),
            away: "Celtics".into(),
            home_score: 112,
            away_score: 104,
        });

        for rx in [&mut a, &mut b] {
            let first = rx.recv().await.unwrap();
            let second = rx.recv().await.unwrap();
            assert_eq!(first.sequence.0, 0);
            assert_eq!(second.sequence.0, 1);
            assert!(second.event.is_actionable());
        }
    }
}
