//! Connectivity monitoring.
//!
//! A background loop polls a [`ConnectivityProbe`] and maintains the
//! authoritative online/offline state. Consumers read the state through
//! a watch channel (always-available current value) or subscribe to the
//! transition broadcast (edge events only). Probe failures only ever
//! read as offline; they never crash the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::domain::models::config::ConnectivityConfig;
use crate::domain::models::{ConnectivityState, ConnectivityTransition};
use crate::domain::ports::ConnectivityProbe;

const TRANSITION_CHANNEL_CAPACITY: usize = 16;

/// Owns the connectivity state and the probe loop.
pub struct ConnectivityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    state: watch::Sender<ConnectivityState>,
    transitions: broadcast::Sender<ConnectivityTransition>,
    probe_interval: Duration,
}

impl ConnectivityMonitor {
    /// Create a monitor in the Offline state. Nothing reads the probe
    /// until [`start`](Self::start) spawns the loop.
    pub fn new(probe: Arc<dyn ConnectivityProbe>, config: &ConnectivityConfig) -> Self {
        let (state, _) = watch::channel(ConnectivityState::Offline);
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            probe,
            state,
            transitions,
            probe_interval: Duration::from_secs(config.probe_interval_secs),
        }
    }

    /// Watch handle on the current state.
    pub fn state(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    /// Subscribe to state-change edges.
    pub fn transitions(&self) -> broadcast::Receiver<ConnectivityTransition> {
        self.transitions.subscribe()
    }

    /// Force the state, emitting a transition if it actually changes.
    pub fn set_state(&self, next: ConnectivityState) {
        apply_state(&self.state, &self.transitions, next);
    }

    /// Spawn the probe loop until `shutdown` fires.
    ///
    /// The first probe runs immediately, so startup reaches a real
    /// reading instead of sitting on the assumed Offline for a full
    /// interval.
    pub fn start(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let probe = self.probe.clone();
        let state = self.state.clone();
        let transitions = self.transitions.clone();
        let probe_interval = self.probe_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(probe_interval);
            tracing::info!(
                interval_secs = probe_interval.as_secs(),
                "started connectivity monitor"
            );

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let next = if probe.check().await {
                            ConnectivityState::Online
                        } else {
                            ConnectivityState::Offline
                        };
                        apply_state(&state, &transitions, next);
                    }

                    _ = shutdown.recv() => {
                        tracing::info!("connectivity monitor shutting down");
                        break;
                    }
                }
            }
        })
    }
}

fn apply_state(
    state: &watch::Sender<ConnectivityState>,
    transitions: &broadcast::Sender<ConnectivityTransition>,
    next: ConnectivityState,
) {
    let prev = *state.borrow();
    if prev == next {
        return;
    }

    let _ = state.send(next);
    let transition = if next.is_online() {
        ConnectivityTransition::CameOnline
    } else {
        ConnectivityTransition::WentOffline
    };
    tracing::info!(from = %prev, to = %next, "connectivity changed");
    let _ = transitions.send(transition);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubProbe {
        online: AtomicBool,
    }

    impl StubProbe {
        fn new(online: bool) -> Arc<Self> {
            Arc::new(Self {
                online: AtomicBool::new(online),
            })
        }

        fn set_online(&self, online: bool) {
            self.online.store(online, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl ConnectivityProbe for StubProbe {
        async fn check(&self) -> bool {
            self.online.load(Ordering::SeqCst)
        }
    }

    fn fast_config() -> ConnectivityConfig {
        ConnectivityConfig {
            probe_interval_secs: 1,
            probe_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_monitor_starts_offline() {
        let monitor = ConnectivityMonitor::new(StubProbe::new(true), &fast_config());
        assert_eq!(monitor.current_state(), ConnectivityState::Offline);
    }

    #[tokio::test]
    async fn test_set_state_emits_transition_once() {
        let monitor = ConnectivityMonitor::new(StubProbe::new(false), &fast_config());
        let mut transitions = monitor.transitions();

        monitor.set_state(ConnectivityState::Online);
        monitor.set_state(ConnectivityState::Online);

        assert_eq!(monitor.current_state(), ConnectivityState::Online);
        assert_eq!(
            transitions.try_recv().unwrap(),
            ConnectivityTransition::CameOnline
        );
        // The repeated set was a no-op.
        assert!(transitions.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_first_probe_runs_immediately() {
        let probe = StubProbe::new(true);
        // A long interval: only the immediate first tick can flip us.
        let config = ConnectivityConfig {
            probe_interval_secs: 60,
            probe_timeout_secs: 1,
        };
        let monitor = ConnectivityMonitor::new(probe, &config);
        let mut state = monitor.state();

        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = monitor.start(shutdown_tx.subscribe());

        tokio::time::timeout(Duration::from_secs(2), state.changed())
            .await
            .expect("first probe never ran")
            .unwrap();
        assert_eq!(*state.borrow(), ConnectivityState::Online);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_flip_produces_offline_transition() {
        let probe = StubProbe::new(true);
        let monitor = ConnectivityMonitor::new(probe.clone(), &fast_config());
        let mut state = monitor.state();
        let mut transitions = monitor.transitions();

        let (shutdown_tx, _) = broadcast::channel(1);
        let handle = monitor.start(shutdown_tx.subscribe());

        tokio::time::timeout(Duration::from_secs(3), state.changed())
            .await
            .expect("never came online")
            .unwrap();
        assert_eq!(
            transitions.recv().await.unwrap(),
            ConnectivityTransition::CameOnline
        );

        probe.set_online(false);
        tokio::time::timeout(Duration::from_secs(3), state.changed())
            .await
            .expect("never went offline")
            .unwrap();
        assert_eq!(*state.borrow(), ConnectivityState::Offline);
        assert_eq!(
            transitions.recv().await.unwrap(),
            ConnectivityTransition::WentOffline
        );

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
