//! Prediction domain model.
//!
//! A prediction record is one user-authored pick and its evolving
//! probability/resolution state. Records live in the local store and
//! are mutated only through the reconciliation transforms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of legs a multi (parlay) prediction may carry.
pub const MAX_LEGS: usize = 7;

/// Shape tag for a prediction, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    /// One factor text, one probability.
    Single,
    /// Ordered legs, each with its own probability; combined probability
    /// is always derived as the product.
    Multi,
}

impl PredictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(Self::Single),
            "multi" | "parlay" => Some(Self::Multi),
            _ => None,
        }
    }
}

/// One leg of a multi prediction: a factor text and its probability,
/// aligned positionally with the other legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionLeg {
    /// Free-form claim, e.g. "Lakers win".
    pub factor_text: String,
    /// Probability assigned to this leg, in [0, 1].
    pub probability: f64,
}

impl PredictionLeg {
    pub fn new(factor_text: impl Into<String>, probability: f64) -> Self {
        Self {
            factor_text: factor_text.into(),
            probability,
        }
    }
}

/// Kind-dependent payload of a prediction.
///
/// Exactly one shape is populated by construction; the `kind` column in
/// the store is derived from this enum, never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionFactors {
    /// A single claim with its probability.
    Single {
        /// Free-form claim, e.g. "Lakers win by 10".
        factor_text: String,
        /// Probability in [0, 1].
        probability: f64,
    },
    /// An ordered sequence of 1..=7 legs.
    Multi {
        /// The legs, in user-entered order.
        legs: Vec<PredictionLeg>,
    },
}

impl PredictionFactors {
    /// Kind tag for this payload.
    pub fn kind(&self) -> PredictionKind {
        match self {
            Self::Single { .. } => PredictionKind::Single,
            Self::Multi { .. } => PredictionKind::Multi,
        }
    }

    /// All factor texts, in order. A single yields one element.
    pub fn factor_texts(&self) -> Vec<&str> {
        match self {
            Self::Single { factor_text, .. } => vec![factor_text.as_str()],
            Self::Multi { legs } => legs.iter().map(|l| l.factor_text.as_str()).collect(),
        }
    }

    /// Combined probability: the single probability, or the product of
    /// all leg probabilities (independence assumption). Derived, never
    /// stored independently of its inputs.
    pub fn combined_probability(&self) -> f64 {
        match self {
            Self::Single { probability, .. } => *probability,
            Self::Multi { legs } => legs.iter().map(|l| l.probability).product(),
        }
    }
}

/// Terminal outcome of a resolved prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Whether the prediction turned out correct.
    pub correct: bool,
    /// Human-readable summary of the actual result, e.g. "Lakers 112-104 Celtics".
    pub actual_result_summary: String,
}

/// One entry in a record's append-only mutation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLogEntry {
    /// When the mutation was applied.
    pub at: DateTime<Utc>,
    /// What happened, e.g. "odds moved -150 -> -110 (delta -0.076)".
    pub message: String,
}

impl UpdateLogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            message: message.into(),
        }
    }
}

/// A user-authored prediction and its evolving state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Unique identifier, stable for the record's lifetime.
    pub id: Uuid,
    /// Kind-dependent claim payload.
    pub factors: PredictionFactors,
    /// User confidence in [0, 1].
    pub confidence: f64,
    /// Optional league tag, e.g. "nba".
    pub league: Option<String>,
    /// Set once at creation, immutable.
    pub created_at: DateTime<Utc>,
    /// True once the remote service has acknowledged the current state.
    pub synced: bool,
    /// True once a terminal game result resolved this record.
    pub resolved: bool,
    /// Present exactly when `resolved` is true, immutable thereafter.
    pub resolution: Option<Resolution>,
    /// Append-only mutation history; never reordered or truncated.
    pub update_log: Vec<UpdateLogEntry>,
}

impl PredictionRecord {
    /// Create a new single prediction. Starts unsynced and unresolved.
    pub fn single(factor_text: impl Into<String>, probability: f64, confidence: f64) -> Self {
        Self::from_factors(
            PredictionFactors::Single {
                factor_text: factor_text.into(),
                probability,
            },
            confidence,
        )
    }

    /// Create a new multi prediction from its legs.
    pub fn multi(legs: Vec<PredictionLeg>, confidence: f64) -> Self {
        Self::from_factors(PredictionFactors::Multi { legs }, confidence)
    }

    /// Create a record from an already-built payload.
    pub fn from_factors(factors: PredictionFactors, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            factors,
            confidence,
            league: None,
            created_at: Utc::now(),
            synced: false,
            resolved: false,
            resolution: None,
            update_log: Vec::new(),
        }
    }

    /// Set the league tag.
    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    /// Kind tag derived from the payload.
    pub fn kind(&self) -> PredictionKind {
        self.factors.kind()
    }

    /// Combined probability (see [`PredictionFactors::combined_probability`]).
    pub fn combined_probability(&self) -> f64 {
        self.factors.combined_probability()
    }

    /// Append an entry to the mutation log.
    pub fn log_update(&mut self, message: impl Into<String>) {
        self.update_log.push(UpdateLogEntry::new(message));
    }

    /// Mark the record resolved with the given outcome. Errors if the
    /// record is already resolved (resolution is immutable).
    pub fn resolve(&mut self, correct: bool, summary: impl Into<String>) -> Result<(), String> {
        if self.resolved {
            return Err("Record is already resolved".to_string());
        }
        self.resolved = true;
        self.resolution = Some(Resolution {
            correct,
            actual_result_summary: summary.into(),
        });
        Ok(())
    }

    /// Validate record shape. The store rejects invalid records with a
    /// `ValidationFailed` before any write; it never clamps.
    pub fn validate(&self) -> Result<(), String> {
        match &self.factors {
            PredictionFactors::Single {
                factor_text,
                probability,
            } => {
                if factor_text.trim().is_empty() {
                    return Err("Factor text cannot be empty".to_string());
                }
                validate_probability("probability", *probability)?;
            }
            PredictionFactors::Multi { legs } => {
                if legs.is_empty() {
                    return Err("Multi prediction needs at least one leg".to_string());
                }
                if legs.len() > MAX_LEGS {
                    return Err(format!(
                        "Multi prediction supports at most {MAX_LEGS} legs, got {}",
                        legs.len()
                    ));
                }
                for (idx, leg) in legs.iter().enumerate() {
                    if leg.factor_text.trim().is_empty() {
                        return Err(format!("Leg {} factor text cannot be empty", idx + 1));
                    }
                    validate_probability(&format!("leg {} probability", idx + 1), leg.probability)?;
                }
            }
        }
        validate_probability("confidence", self.confidence)?;
        if self.resolved && self.resolution.is_none() {
            return Err("Resolved record must carry a resolution".to_string());
        }
        if !self.resolved && self.resolution.is_some() {
            return Err("Unresolved record cannot carry a resolution".to_string());
        }
        Ok(())
    }
}

fn validate_probability(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{name} must be a finite number"));
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be within [0, 1], got {value}"));
    }
    Ok(())
}

/// Clamp a probability into [0, 1]. All mutation transforms apply this
/// after arithmetic; applying it twice is a no-op.
pub fn clamp_probability(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_creation_defaults() {
        let record = PredictionRecord::single("Lakers win by 10", 0.55, 0.8);
        assert_eq!(record.kind(), PredictionKind::Single);
        assert!(!record.synced);
        assert!(!record.resolved);
        assert!(record.resolution.is_none());
        assert!(record.update_log.is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_combined_probability_is_product() {
        let record = PredictionRecord::multi(
            vec![
                PredictionLeg::new("Lakers win", 0.6),
                PredictionLeg::new("Celtics cover", 0.5),
            ],
            0.7,
        );
        assert!((record.combined_probability() - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_single_combined_probability_is_probability() {
        let record = PredictionRecord::single("Heat win", 0.42, 0.5);
        assert!((record.combined_probability() - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_validation_rejects_empty_factor_text() {
        let record = PredictionRecord::single("   ", 0.5, 0.5);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_out_of_range_probability() {
        let record = PredictionRecord::single("Lakers win", 1.2, 0.5);
        assert!(record.validate().is_err());

        let record = PredictionRecord::single("Lakers win", f64::NAN, 0.5);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_leg_count_out_of_bounds() {
        let record = PredictionRecord::multi(Vec::new(), 0.5);
        assert!(record.validate().is_err());

        let legs = (0..8)
            .map(|i| PredictionLeg::new(format!("Team {i} wins"), 0.5))
            .collect();
        let record = PredictionRecord::multi(legs, 0.5);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_resolve_is_terminal() {
        let mut record = PredictionRecord::single("Lakers win", 0.6, 0.8);
        record.resolve(true, "Lakers 112-104 Celtics").unwrap();
        assert!(record.resolved);
        assert!(record.resolution.as_ref().unwrap().correct);
        assert!(record.validate().is_ok());

        // Resolution is immutable once set.
        assert!(record.resolve(false, "again").is_err());
    }

    #[test]
    fn test_update_log_appends_in_order() {
        let mut record = PredictionRecord::single("Lakers win", 0.6, 0.8);
        record.log_update("first");
        record.log_update("second");
        assert_eq!(record.update_log.len(), 2);
        assert_eq!(record.update_log[0].message, "first");
        assert_eq!(record.update_log[1].message, "second");
    }

    #[test]
    fn test_clamp_probability_bounds() {
        assert_eq!(clamp_probability(1.5), 1.0);
        assert_eq!(clamp_probability(-0.2), 0.0);
        assert_eq!(clamp_probability(0.37), 0.37);
        // Idempotent: clamping twice changes nothing.
        assert_eq!(clamp_probability(clamp_probability(1.5)), 1.0);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!(
            PredictionKind::from_str(PredictionKind::Multi.as_str()),
            Some(PredictionKind::Multi)
        );
        assert_eq!(PredictionKind::from_str("PARLAY"), Some(PredictionKind::Multi));
        assert_eq!(PredictionKind::from_str("unknown"), None);
    }
}
