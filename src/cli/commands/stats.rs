//! Implementation of the `tipsheet stats` command.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::StoreStats;
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct StatsArgs {}

#[derive(Debug, serde::Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: StoreStats,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let s = &self.stats;
        let mut lines = vec!["Prediction Store:".to_string()];
        lines.push(format!("  Total:      {}", s.total));
        lines.push(format!("  Singles:    {}", s.singles));
        lines.push(format!("  Multis:     {}", s.multis));
        lines.push(format!("  Unsynced:   {}", s.unsynced));
        lines.push(format!(
            "  Resolved:   {} ({} correct)",
            s.resolved, s.correct
        ));
        if !s.by_league.is_empty() {
            lines.push("  By league:".to_string());
            for (league, count) in &s.by_league {
                lines.push(format!("    {:<12} {}", league, count));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: StatsArgs, json_mode: bool, config: &Config) -> Result<()> {
    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )));

    let stats = store
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read stats: {}", e))?;

    output(&StatsOutput { stats }, json_mode);
    Ok(())
}
