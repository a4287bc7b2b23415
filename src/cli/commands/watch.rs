//! Implementation of the `tipsheet watch` command.
//!
//! Brings the full dashboard runtime up in the foreground: connectivity
//! probing, remote event polling, reconciliation, and sync all run
//! until Ctrl-C (or `--duration` elapses). Each observed event and
//! store change is printed as it happens.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::adapters::remote::{HttpConnectivityProbe, PollingEventTransport, RemoteClient};
use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::commands::current::read_pin;
use crate::domain::models::Config;
use crate::services::{
    ConnectivityMonitor, DashboardRuntime, PredictionStore, SequencedEvent, StoreEvent,
};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Stop after this many seconds (default: run until Ctrl-C)
    #[arg(long)]
    pub duration: Option<u64>,
}

pub async fn execute(args: WatchArgs, json_mode: bool, config: &Config) -> Result<()> {
    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )));

    let remote = Arc::new(
        RemoteClient::new(&config.remote)
            .map_err(|e| anyhow::anyhow!("Failed to build remote client: {}", e))?,
    );
    let probe = Arc::new(HttpConnectivityProbe::new(
        &config.remote.base_url,
        Duration::from_secs(config.connectivity.probe_timeout_secs),
    ));
    let monitor = Arc::new(ConnectivityMonitor::new(probe, &config.connectivity));
    let transport = Arc::new(PollingEventTransport::new(
        remote.clone(),
        monitor.state(),
        Duration::from_secs(config.events.poll_interval_secs),
    ));

    let runtime = DashboardRuntime::new(store, remote, monitor, transport, config).await;

    // Seed the live view from the CLI pin, if one is set.
    if let Some(id) = read_pin(config) {
        if let Ok(Some(record)) = runtime.store().get(id).await {
            runtime.projector().set_current(record);
        }
    }

    let mut events = runtime.bus().subscribe();
    let mut store_events = runtime.store().subscribe();
    let mut connectivity = runtime.connectivity().state();
    let mut view = runtime.projector().subscribe();

    runtime
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start runtime: {}", e))?;

    if !json_mode {
        println!(
            "Watching {} for game events (Ctrl-C to stop)...",
            config.remote.base_url
        );
    }

    let deadline = args
        .duration
        .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));

    loop {
        let timeout = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = timeout => break,
            changed = connectivity.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *connectivity.borrow_and_update();
                print_connectivity(state, json_mode);
            }
            event = events.recv() => match event {
                Ok(ev) => print_event(&ev, json_mode),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "watch output fell behind the event bus");
                }
                Err(RecvError::Closed) => break,
            },
            change = store_events.recv() => match change {
                Ok(ev) => print_store_event(&ev, json_mode),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "watch output fell behind the store feed");
                }
                Err(RecvError::Closed) => break,
            },
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                print_view(current.as_ref(), json_mode);
            }
        }
    }

    runtime.stop().await;
    if !json_mode {
        println!("Stopped.");
    }
    Ok(())
}

fn short(id: uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn print_connectivity(state: crate::domain::models::ConnectivityState, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::json!({ "kind": "connectivity", "state": state.to_string() })
        );
    } else {
        println!("connectivity: {}", state);
    }
}

fn print_event(event: &SequencedEvent, json_mode: bool) {
    if json_mode {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{}", line);
        }
    } else {
        println!("[{}] {}", event.sequence, event.event.describe());
    }
}

fn print_store_event(event: &StoreEvent, json_mode: bool) {
    match event {
        StoreEvent::Put(record) => {
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({ "kind": "store_put", "record": record })
                );
            } else {
                let status = if record.resolved {
                    match &record.resolution {
                        Some(r) if r.correct => ", resolved correct",
                        Some(_) => ", resolved incorrect",
                        None => "",
                    }
                } else if record.synced {
                    ""
                } else {
                    ", unsynced"
                };
                println!(
                    "store: {} updated (p={:.3}{})",
                    short(record.id),
                    record.combined_probability(),
                    status
                );
            }
        }
        StoreEvent::Deleted(id) => {
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({ "kind": "store_deleted", "id": id })
                );
            } else {
                println!("store: {} deleted", short(*id));
            }
        }
        StoreEvent::Cleared => {
            if json_mode {
                println!("{}", serde_json::json!({ "kind": "store_cleared" }));
            } else {
                println!("store: cleared");
            }
        }
    }
}

fn print_view(current: Option<&crate::domain::models::PredictionRecord>, json_mode: bool) {
    match current {
        Some(record) => {
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({ "kind": "current", "record": record })
                );
            } else {
                println!(
                    "current: {} p={:.3} conf={:.2}",
                    short(record.id),
                    record.combined_probability(),
                    record.confidence
                );
            }
        }
        None => {
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({ "kind": "current", "record": null })
                );
            } else {
                println!("current: none");
            }
        }
    }
}
