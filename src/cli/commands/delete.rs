//! Implementation of the `tipsheet delete` command.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::id_resolver::resolve_prediction_id;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Prediction ID (or any unique prefix)
    pub id: String,
}

#[derive(Debug, serde::Serialize)]
pub struct DeleteOutput {
    pub success: bool,
    pub id: String,
    pub message: String,
}

impl CommandOutput for DeleteOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: DeleteArgs, json_mode: bool, config: &Config) -> Result<()> {
    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool.clone()),
    )));

    let id = resolve_prediction_id(&pool, &args.id).await?;
    store
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete prediction: {}", e))?;

    let output_data = DeleteOutput {
        success: true,
        id: id.to_string(),
        message: format!("Deleted prediction {}", &id.to_string()[..8]),
    };
    output(&output_data, json_mode);
    Ok(())
}
