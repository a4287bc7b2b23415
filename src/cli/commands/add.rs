//! Implementation of the `tipsheet add` command.
//!
//! Records a prediction locally first, then tries one remote create.
//! A failed or skipped remote attempt leaves the record queued with
//! `synced = false`; the next `tipsheet sync` picks it up.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::remote::{HttpConnectivityProbe, RemoteClient};
use crate::adapters::sqlite::{open_configured_database, SqlitePredictionRepository};
use crate::cli::commands::show::RecordDetailOutput;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, PredictionFactors, PredictionLeg};
use crate::domain::ports::{ConnectivityProbe, RemoteService};
use crate::services::PredictionStore;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Factor text for a single prediction, e.g. "Lakers win tonight"
    #[arg(required_unless_present = "leg", conflicts_with = "leg")]
    pub factor: Option<String>,

    /// Probability of the single factor (0.0 to 1.0)
    #[arg(short, long, requires = "factor")]
    pub probability: Option<f64>,

    /// Parlay leg as "text:probability"; repeat once per leg
    #[arg(long)]
    pub leg: Vec<String>,

    /// Confidence in the prediction overall (0.0 to 1.0)
    #[arg(short, long, default_value_t = 0.5)]
    pub confidence: f64,

    /// League tag, e.g. "nba"
    #[arg(short, long)]
    pub league: Option<String>,

    /// Skip the remote create attempt and leave the record queued
    #[arg(long)]
    pub local_only: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct AddOutput {
    pub success: bool,
    pub message: String,
    pub record: RecordDetailOutput,
}

impl CommandOutput for AddOutput {
    fn to_human(&self) -> String {
        format!("{}\n\n{}", self.message, self.record.to_human())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Parse a "text:probability" leg argument. The split is on the last
/// colon so factor texts may contain colons themselves.
fn parse_leg(raw: &str) -> Result<PredictionLeg> {
    let Some((text, prob)) = raw.rsplit_once(':') else {
        bail!("Invalid leg '{}': expected \"text:probability\"", raw);
    };
    let text = text.trim();
    if text.is_empty() {
        bail!("Invalid leg '{}': factor text is empty", raw);
    }
    let probability: f64 = prob
        .trim()
        .parse()
        .with_context(|| format!("Invalid leg '{}': probability is not a number", raw))?;
    Ok(PredictionLeg::new(text, probability))
}

fn build_factors(args: &AddArgs) -> Result<PredictionFactors> {
    if !args.leg.is_empty() {
        if args.leg.len() < 2 {
            bail!("A parlay needs at least two --leg arguments; use a plain factor for singles");
        }
        let legs = args
            .leg
            .iter()
            .map(|raw| parse_leg(raw))
            .collect::<Result<Vec<_>>>()?;
        return Ok(PredictionFactors::Multi { legs });
    }

    let factor_text = args
        .factor
        .clone()
        .context("A factor text is required for a single prediction")?;
    let probability = args
        .probability
        .context("A single prediction needs --probability")?;
    Ok(PredictionFactors::Single {
        factor_text,
        probability,
    })
}

pub async fn execute(args: AddArgs, json_mode: bool, config: &Config) -> Result<()> {
    let factors = build_factors(&args)?;

    let pool = open_configured_database(&config.database)
        .await
        .context("Failed to open database. Run 'tipsheet init' first.")?;
    let store = Arc::new(PredictionStore::new(Arc::new(
        SqlitePredictionRepository::new(pool),
    )));

    let mut record = store
        .create_record(factors, args.confidence, args.league.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create prediction: {}", e))?;

    let mut message = format!("Recorded prediction {}", &record.id.to_string()[..8]);

    if args.local_only {
        message.push_str(" (queued for sync)");
    } else {
        let probe = HttpConnectivityProbe::new(
            &config.remote.base_url,
            Duration::from_secs(config.connectivity.probe_timeout_secs),
        );
        if probe.check().await {
            let remote = RemoteClient::new(&config.remote)
                .map_err(|e| anyhow::anyhow!("Failed to build remote client: {}", e))?;
            match remote.create(&record).await {
                Ok(()) => {
                    record.synced = true;
                    record = store
                        .put(record)
                        .await
                        .map_err(|e| anyhow::anyhow!("Failed to mark record synced: {}", e))?;
                    message.push_str(" (synced)");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "remote create failed; record stays queued");
                    message.push_str(" (remote unreachable, queued for sync)");
                }
            }
        } else {
            message.push_str(" (offline, queued for sync)");
        }
    }

    let output_data = AddOutput {
        success: true,
        message,
        record: RecordDetailOutput::from(&record),
    };
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leg_basic() {
        let leg = parse_leg("Lakers win:0.6").unwrap();
        assert_eq!(leg.factor_text, "Lakers win");
        assert!((leg.probability - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_leg_with_colon_in_text() {
        let leg = parse_leg("Game total over 210: yes:0.55").unwrap();
        assert_eq!(leg.factor_text, "Game total over 210: yes");
        assert!((leg.probability - 0.55).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_leg_missing_probability() {
        assert!(parse_leg("Lakers win").is_err());
        assert!(parse_leg("Lakers win:not-a-number").is_err());
    }

    #[test]
    fn test_parse_leg_empty_text() {
        assert!(parse_leg(":0.5").is_err());
    }

    #[test]
    fn test_build_factors_single() {
        let args = AddArgs {
            factor: Some("Lakers win".to_string()),
            probability: Some(0.6),
            leg: vec![],
            confidence: 0.5,
            league: None,
            local_only: true,
        };
        let factors = build_factors(&args).unwrap();
        assert!(matches!(factors, PredictionFactors::Single { .. }));
    }

    #[test]
    fn test_build_factors_rejects_one_leg() {
        let args = AddArgs {
            factor: None,
            probability: None,
            leg: vec!["Lakers win:0.6".to_string()],
            confidence: 0.5,
            league: None,
            local_only: true,
        };
        assert!(build_factors(&args).is_err());
    }

    #[test]
    fn test_build_factors_multi() {
        let args = AddArgs {
            factor: None,
            probability: None,
            leg: vec!["Lakers win:0.6".to_string(), "Heat cover:0.5".to_string()],
            confidence: 0.5,
            league: None,
            local_only: true,
        };
        let factors = build_factors(&args).unwrap();
        match factors {
            PredictionFactors::Multi { legs } => assert_eq!(legs.len(), 2),
            PredictionFactors::Single { .. } => panic!("expected a parlay"),
        }
    }
}
