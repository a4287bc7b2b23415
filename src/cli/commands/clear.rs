//! Implementation of the `tipsheet clear` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Confirm removing every prediction
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ClearOutput {
    pub success: bool,
    pub removed: u64,
    pub message: String,
}

impl CommandOutput for ClearOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ClearArgs, json_mode: bool, config: &Config) -> Result<()> {
    if !args.yes {
        bail!("This removes every prediction. Re-run with --yes to confirm.");
    }

    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )));

    let removed = store
        .clear_all()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to clear predictions: {}", e))?;

    // A pinned record cannot survive a cleared store.
    let pin = super::current::pin_path(config);
    if pin.exists() {
        std::fs::remove_file(&pin).with_context(|| format!("Failed to remove {:?}", pin))?;
    }

    let output_data = ClearOutput {
        success: true,
        removed,
        message: format!("Removed {} prediction(s).", removed),
    };
    output(&output_data, json_mode);
    Ok(())
}
