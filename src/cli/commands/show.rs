//! Implementation of the `tipsheet show` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::id_resolver::resolve_prediction_id;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, PredictionFactors, PredictionRecord};
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Prediction ID (or any unique prefix)
    pub id: String,
}

/// Full record view shared by show, add, and current.
#[derive(Debug, serde::Serialize)]
pub struct RecordDetailOutput {
    pub id: String,
    pub kind: String,
    pub legs: Vec<LegOutput>,
    pub combined_probability: f64,
    pub confidence: f64,
    pub league: Option<String>,
    pub created_at: String,
    pub synced: bool,
    pub resolved: bool,
    pub resolution: Option<ResolutionOutput>,
    pub updates: Vec<UpdateOutput>,
}

#[derive(Debug, serde::Serialize)]
pub struct LegOutput {
    pub factor_text: String,
    pub probability: f64,
}

#[derive(Debug, serde::Serialize)]
pub struct ResolutionOutput {
    pub correct: bool,
    pub actual_result_summary: String,
}

#[derive(Debug, serde::Serialize)]
pub struct UpdateOutput {
    pub at: String,
    pub message: String,
}

impl From<&PredictionRecord> for RecordDetailOutput {
    fn from(record: &PredictionRecord) -> Self {
        let legs = match &record.factors {
            PredictionFactors::Single {
                factor_text,
                probability,
            } => vec![LegOutput {
                factor_text: factor_text.clone(),
                probability: *probability,
            }],
            PredictionFactors::Multi { legs } => legs
                .iter()
                .map(|leg| LegOutput {
                    factor_text: leg.factor_text.clone(),
                    probability: leg.probability,
                })
                .collect(),
        };

        Self {
            id: record.id.to_string(),
            kind: record.kind().as_str().to_string(),
            legs,
            combined_probability: record.combined_probability(),
            confidence: record.confidence,
            league: record.league.clone(),
            created_at: record.created_at.to_rfc3339(),
            synced: record.synced,
            resolved: record.resolved,
            resolution: record.resolution.as_ref().map(|r| ResolutionOutput {
                correct: r.correct,
                actual_result_summary: r.actual_result_summary.clone(),
            }),
            updates: record
                .update_log
                .iter()
                .map(|entry| UpdateOutput {
                    at: entry.at.to_rfc3339(),
                    message: entry.message.clone(),
                })
                .collect(),
        }
    }
}

impl CommandOutput for RecordDetailOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Prediction {}", self.id)];
        lines.push(format!("  Kind:        {}", self.kind));
        if let Some(ref league) = self.league {
            lines.push(format!("  League:      {}", league));
        }
        lines.push(format!("  Created:     {}", self.created_at));
        lines.push(format!("  Confidence:  {:.2}", self.confidence));
        lines.push(format!(
            "  Probability: {:.3}",
            self.combined_probability
        ));
        lines.push(format!(
            "  Synced:      {}",
            if self.synced { "yes" } else { "no" }
        ));

        let status = match &self.resolution {
            Some(r) if r.correct => format!("resolved correct ({})", r.actual_result_summary),
            Some(r) => format!("resolved incorrect ({})", r.actual_result_summary),
            None => "open".to_string(),
        };
        lines.push(format!("  Status:      {}", status));

        if self.legs.len() > 1 {
            lines.push("  Legs:".to_string());
            for (i, leg) in self.legs.iter().enumerate() {
                lines.push(format!(
                    "    {}. {:<40} {:.3}",
                    i + 1,
                    leg.factor_text,
                    leg.probability
                ));
            }
        } else if let Some(leg) = self.legs.first() {
            lines.push(format!("  Factor:      {}", leg.factor_text));
        }

        if !self.updates.is_empty() {
            lines.push("  Updates:".to_string());
            for entry in &self.updates {
                lines.push(format!("    {}  {}", entry.at, entry.message));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ShowArgs, json_mode: bool, config: &Config) -> Result<()> {
    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool.clone()),
    )));

    let id = resolve_prediction_id(&pool, &args.id).await?;
    let Some(record) = store
        .get(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load prediction: {}", e))?
    else {
        bail!("No prediction found with ID {}", id);
    };

    output(&RecordDetailOutput::from(&record), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PredictionLeg;

    #[test]
    fn test_detail_output_single() {
        let record = PredictionRecord::single("Lakers win", 0.6, 0.8).with_league("nba");
        let detail = RecordDetailOutput::from(&record);

        assert_eq!(detail.kind, "single");
        assert_eq!(detail.legs.len(), 1);
        assert_eq!(detail.league.as_deref(), Some("nba"));

        let human = detail.to_human();
        assert!(human.contains("Factor:      Lakers win"));
        assert!(human.contains("Synced:      no"));
        assert!(human.contains("Status:      open"));
    }

    #[test]
    fn test_detail_output_multi_lists_legs() {
        let record = PredictionRecord::multi(
            vec![
                PredictionLeg::new("Lakers win", 0.6),
                PredictionLeg::new("Heat cover", 0.5),
            ],
            0.7,
        );
        let detail = RecordDetailOutput::from(&record);
        assert_eq!(detail.legs.len(), 2);
        assert!((detail.combined_probability - 0.30).abs() < 1e-9);

        let human = detail.to_human();
        assert!(human.contains("Legs:"));
        assert!(human.contains("1. Lakers win"));
        assert!(human.contains("2. Heat cover"));
    }

    #[test]
    fn test_detail_output_resolution_and_updates() {
        let mut record = PredictionRecord::single("Lakers win", 0.6, 0.8);
        record.log_update("odds moved on Lakers");
        record.resolve(true, "Lakers 112-104 Heat").unwrap();

        let detail = RecordDetailOutput::from(&record);
        let human = detail.to_human();
        assert!(human.contains("resolved correct (Lakers 112-104 Heat)"));
        assert!(human.contains("odds moved on Lakers"));
    }
}
