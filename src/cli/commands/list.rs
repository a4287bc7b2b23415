//! Implementation of the `tipsheet list` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, PredictionKind, PredictionRecord};
use crate::domain::ports::PredictionFilters;
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum number of predictions to show
    #[arg(short('n'), long, default_value = "20")]
    pub limit: i64,

    /// Filter by kind: "single" or "multi"
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Filter by league tag
    #[arg(long)]
    pub league: Option<String>,

    /// Only resolved predictions
    #[arg(long, conflicts_with = "unresolved")]
    pub resolved: bool,

    /// Only unresolved predictions
    #[arg(long)]
    pub unresolved: bool,

    /// Only predictions not yet pushed to the remote
    #[arg(long)]
    pub unsynced: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct ListOutput {
    pub predictions: Vec<PredictionRecord>,
    pub total: usize,
}

impl CommandOutput for ListOutput {
    fn to_human(&self) -> String {
        if self.predictions.is_empty() {
            return "No predictions found.".to_string();
        }
        let table = TableFormatter::new().format_records(&self.predictions);
        format!("{}\nShowing {} prediction(s)", table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn build_filters(args: &ListArgs) -> Result<PredictionFilters> {
    let kind = match args.kind.as_deref() {
        None => None,
        Some(raw) => match PredictionKind::from_str(raw) {
            Some(kind) => Some(kind),
            None => bail!("Unknown kind '{}': expected \"single\" or \"multi\"", raw),
        },
    };

    let resolved = if args.resolved {
        Some(true)
    } else if args.unresolved {
        Some(false)
    } else {
        None
    };

    Ok(PredictionFilters {
        kind,
        league: args.league.clone(),
        resolved,
        synced: if args.unsynced { Some(false) } else { None },
        limit: Some(args.limit),
    })
}

pub async fn execute(args: ListArgs, json_mode: bool, config: &Config) -> Result<()> {
    if args.limit < 1 {
        bail!("--limit must be at least 1");
    }
    let filters = build_filters(&args)?;

    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )));

    let predictions = store
        .list_recent(filters)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list predictions: {}", e))?;

    let output_data = ListOutput {
        total: predictions.len(),
        predictions,
    };
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ListArgs {
        ListArgs {
            limit: 20,
            kind: None,
            league: None,
            resolved: false,
            unresolved: false,
            unsynced: false,
        }
    }

    #[test]
    fn test_build_filters_defaults() {
        let filters = build_filters(&args()).unwrap();
        assert_eq!(filters.kind, None);
        assert_eq!(filters.resolved, None);
        assert_eq!(filters.synced, None);
        assert_eq!(filters.limit, Some(20));
    }

    #[test]
    fn test_build_filters_kind() {
        let mut a = args();
        a.kind = Some("multi".to_string());
        let filters = build_filters(&a).unwrap();
        assert_eq!(filters.kind, Some(PredictionKind::Multi));

        a.kind = Some("spread".to_string());
        assert!(build_filters(&a).is_err());
    }

    #[test]
    fn test_build_filters_resolution_and_sync() {
        let mut a = args();
        a.unresolved = true;
        a.unsynced = true;
        let filters = build_filters(&a).unwrap();
        assert_eq!(filters.resolved, Some(false));
        assert_eq!(filters.synced, Some(false));
    }

    #[test]
    fn test_empty_list_output() {
        let out = ListOutput {
            predictions: vec![],
            total: 0,
        };
        assert_eq!(out.to_human(), "No predictions found.");
    }
}
