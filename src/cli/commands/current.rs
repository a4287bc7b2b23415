//! Implementation of the `tipsheet current` command.
//!
//! The dashboard keeps its current selection in process memory; a
//! one-shot CLI cannot, so the selection is pinned to a one-line state
//! file next to the database. `watch` seeds its live view from the
//! same pin.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::commands::show::RecordDetailOutput;
use crate::cli::id_resolver::resolve_prediction_id;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct CurrentArgs {
    /// Prediction ID (or unique prefix) to pin as current
    pub id: Option<String>,

    /// Unpin the current prediction
    #[arg(long, conflicts_with = "id")]
    pub clear: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct CurrentOutput {
    pub pinned: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordDetailOutput>,
}

impl CommandOutput for CurrentOutput {
    fn to_human(&self) -> String {
        match &self.record {
            Some(record) => format!("{}\n\n{}", self.message, record.to_human()),
            None => self.message.clone(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Where the pin file lives: next to the database file.
pub(crate) fn pin_path(config: &Config) -> PathBuf {
    Path::new(&config.database.path)
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        .join("current")
}

pub(crate) fn read_pin(config: &Config) -> Option<Uuid> {
    let raw = std::fs::read_to_string(pin_path(config)).ok()?;
    Uuid::parse_str(raw.trim()).ok()
}

fn write_pin(config: &Config, id: Uuid) -> Result<()> {
    let path = pin_path(config);
    std::fs::write(&path, format!("{id}\n"))
        .with_context(|| format!("Failed to write {:?}", path))
}

fn clear_pin(config: &Config) -> Result<()> {
    let path = pin_path(config);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
    }
}

pub async fn execute(args: CurrentArgs, json_mode: bool, config: &Config) -> Result<()> {
    if args.clear {
        clear_pin(config)?;
        let out = CurrentOutput {
            pinned: false,
            message: "Cleared the current prediction.".to_string(),
            record: None,
        };
        output(&out, json_mode);
        return Ok(());
    }

    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool.clone()),
    )));

    if let Some(ref raw) = args.id {
        let id = resolve_prediction_id(&pool, raw).await?;
        let Some(record) = store
            .get(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load prediction: {}", e))?
        else {
            bail!("No prediction found with ID {}", id);
        };
        write_pin(config, id)?;
        let out = CurrentOutput {
            pinned: true,
            message: format!("Pinned {} as the current prediction.", &id.to_string()[..8]),
            record: Some(RecordDetailOutput::from(&record)),
        };
        output(&out, json_mode);
        return Ok(());
    }

    // Bare invocation: show whatever is pinned.
    let Some(id) = read_pin(config) else {
        let out = CurrentOutput {
            pinned: false,
            message: "No current prediction. Pin one with 'tipsheet current <id>'.".to_string(),
            record: None,
        };
        output(&out, json_mode);
        return Ok(());
    };

    match store
        .get(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load prediction: {}", e))?
    {
        Some(record) => {
            let out = CurrentOutput {
                pinned: true,
                message: "Current prediction:".to_string(),
                record: Some(RecordDetailOutput::from(&record)),
            };
            output(&out, json_mode);
        }
        None => {
            // The pinned record was deleted out from under the pin.
            clear_pin(config)?;
            let out = CurrentOutput {
                pinned: false,
                message: "The pinned prediction no longer exists; cleared the pin.".to_string(),
                record: None,
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
