//! Implementation of the `tipsheet sync` command.
//!
//! Probes the remote once; when reachable it runs the same full
//! resync the dashboard runs on a came-online transition (pull
//! history, then push the unsynced queue). Offline is a normal
//! outcome, not an error.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::adapters::remote::{HttpConnectivityProbe, RemoteClient};
use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::output::progress::create_spinner_with_message;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, ConnectivityState};
use crate::domain::ports::ConnectivityProbe;
use crate::services::{PredictionStore, SyncCoordinator};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Only push queued local changes; skip the history pull
    #[arg(long)]
    pub push_only: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct SyncOutput {
    pub online: bool,
    pub pulled: usize,
    pub pushed: usize,
    pub failed: usize,
    pub message: String,
}

impl CommandOutput for SyncOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SyncArgs, json_mode: bool, config: &Config) -> Result<()> {
    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )));

    let spinner = (!json_mode).then(|| create_spinner_with_message("Checking connectivity..."));

    let probe = HttpConnectivityProbe::new(
        &config.remote.base_url,
        Duration::from_secs(config.connectivity.probe_timeout_secs),
    );
    if !probe.check().await {
        if let Some(ref s) = spinner {
            s.finish_and_clear();
        }
        let out = SyncOutput {
            online: false,
            pulled: 0,
            pushed: 0,
            failed: 0,
            message: format!(
                "Remote at {} is unreachable; local records stay queued.",
                config.remote.base_url
            ),
        };
        output(&out, json_mode);
        return Ok(());
    }

    let remote = Arc::new(
        RemoteClient::new(&config.remote)
            .map_err(|e| anyhow::anyhow!("Failed to build remote client: {}", e))?,
    );

    // A one-shot sync is online by construction; the watch channel
    // only exists to satisfy the coordinator's gate.
    let (_state_tx, state_rx) = watch::channel(ConnectivityState::Online);
    let coordinator = SyncCoordinator::new(store, remote, state_rx, config.sync.clone());

    if let Some(ref s) = spinner {
        s.set_message("Syncing...");
    }

    let (pulled, report) = if args.push_only {
        let report = coordinator
            .push_unsynced()
            .await
            .map_err(|e| anyhow::anyhow!("Push failed: {}", e))?;
        (0, report)
    } else {
        let outcome = coordinator
            .full_resync()
            .await
            .map_err(|e| anyhow::anyhow!("Sync failed: {}", e))?;
        (outcome.pulled, outcome.push)
    };

    let message = if report.failed > 0 {
        format!(
            "Pulled {} record(s); pushed {}; {} failed and stay queued.",
            pulled, report.pushed, report.failed
        )
    } else {
        format!("Pulled {} record(s); pushed {}.", pulled, report.pushed)
    };

    if let Some(ref s) = spinner {
        s.finish_and_clear();
    }

    let out = SyncOutput {
        online: true,
        pulled,
        pushed: report.pushed,
        failed: report.failed,
        message,
    };
    output(&out, json_mode);
    Ok(())
}
