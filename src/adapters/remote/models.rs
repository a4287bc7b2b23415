//! Remote prediction service request and response models.
//!
//! These structs map to the remote API's camelCase JSON payloads. They
//! are used internally by the remote adapter and are not part of the
//! public domain model; `synced` is local-only and never crosses the
//! wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    GameEvent, PredictionFactors, PredictionLeg, PredictionRecord, Resolution, UpdateLogEntry,
};

/// A prediction as the remote service sees it.
///
/// The kind-dependent fields mirror the domain enum: a single carries
/// `factorText`/`probability`, a multi carries `factorTexts` aligned
/// positionally with `individualProbabilities`. `combinedProbability`
/// is sent for the remote's convenience but never trusted on the way
/// back in; the domain always re-derives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    /// Record id, a UUID string.
    pub id: String,
    /// "single" or "multi".
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_texts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_probabilities: Option<Vec<f64>>,
    pub combined_probability: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionPayload>,
    #[serde(default)]
    pub update_log: Vec<UpdateLogEntryPayload>,
}

/// Terminal outcome on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionPayload {
    pub correct: bool,
    pub actual_result_summary: String,
}

/// One mutation-log entry on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogEntryPayload {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Response wrapper for `GET /predictions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub predictions: Vec<PredictionPayload>,
}

/// Response wrapper for `GET /events?since=N`.
///
/// `cursor` is the position to resume the next poll from; the event
/// payloads themselves are the domain's tagged wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    pub events: Vec<GameEvent>,
    pub cursor: u64,
}

impl From<&PredictionRecord> for PredictionPayload {
    fn from(record: &PredictionRecord) -> Self {
        let (factor_text, factor_texts, probability, individual_probabilities) =
            match &record.factors {
                PredictionFactors::Single {
                    factor_text,
                    probability,
                } => (Some(factor_text.clone()), None, Some(*probability), None),
                PredictionFactors::Multi { legs } => (
                    None,
                    Some(legs.iter().map(|l| l.factor_text.clone()).collect()),
                    None,
                    Some(legs.iter().map(|l| l.probability).collect()),
                ),
            };

        Self {
            id: record.id.to_string(),
            kind: record.kind().as_str().to_string(),
            factor_text,
            factor_texts,
            probability,
            individual_probabilities,
            combined_probability: record.combined_probability(),
            confidence: record.confidence,
            league: record.league.clone(),
            created_at: record.created_at,
            resolved: record.resolved,
            resolution: record.resolution.as_ref().map(|r| ResolutionPayload {
                correct: r.correct,
                actual_result_summary: r.actual_result_summary.clone(),
            }),
            update_log: record
                .update_log
                .iter()
                .map(|e| UpdateLogEntryPayload {
                    at: e.at,
                    message: e.message.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<PredictionPayload> for PredictionRecord {
    type Error = DomainError;

    /// Rebuild a domain record from the wire shape.
    ///
    /// A payload exists only because the remote holds the record, so
    /// the result is `synced = true`; the pull merge decides what to
    /// keep of any local copy.
    fn try_from(payload: PredictionPayload) -> DomainResult<Self> {
        let id = Uuid::parse_str(&payload.id)
            .map_err(|e| DomainError::SerializationError(format!("invalid record id: {e}")))?;

        let factors = match payload.kind.as_str() {
            "single" => {
                let factor_text = payload.factor_text.ok_or_else(|| {
                    DomainError::SerializationError("single payload missing factorText".to_string())
                })?;
                let probability = payload.probability.ok_or_else(|| {
                    DomainError::SerializationError(
                        "single payload missing probability".to_string(),
                    )
                })?;
                PredictionFactors::Single {
                    factor_text,
                    probability,
                }
            }
            "multi" => {
                let texts = payload.factor_texts.ok_or_else(|| {
                    DomainError::SerializationError("multi payload missing factorTexts".to_string())
                })?;
                let probs = payload.individual_probabilities.ok_or_else(|| {
                    DomainError::SerializationError(
                        "multi payload missing individualProbabilities".to_string(),
                    )
                })?;
                if texts.len() != probs.len() {
                    return Err(DomainError::SerializationError(format!(
                        "multi payload has {} factor texts but {} probabilities",
                        texts.len(),
                        probs.len()
                    )));
                }
                PredictionFactors::Multi {
                    legs: texts
                        .into_iter()
                        .zip(probs)
                        .map(|(factor_text, probability)| PredictionLeg {
                            factor_text,
                            probability,
                        })
                        .collect(),
                }
            }
            other => {
                return Err(DomainError::SerializationError(format!(
                    "unknown prediction kind: {other}"
                )))
            }
        };

        Ok(PredictionRecord {
            id,
            factors,
            confidence: payload.confidence,
            league: payload.league,
            created_at: payload.created_at,
            synced: true,
            resolved: payload.resolved,
            resolution: payload.resolution.map(|r| Resolution {
                correct: r.correct,
                actual_result_summary: r.actual_result_summary,
            }),
            update_log: payload
                .update_log
                .into_iter()
                .map(|e| UpdateLogEntry {
                    at: e.at,
                    message: e.message,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PredictionKind;

    #[test]
    fn test_single_record_to_payload_wire_shape() {
        let record = PredictionRecord::single("Lakers win by 10", 0.55, 0.8).with_league("nba");
        let payload = PredictionPayload::from(&record);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["kind"], "single");
        assert_eq!(json["factorText"], "Lakers win by 10");
        assert_eq!(json["probability"], 0.55);
        assert_eq!(json["combinedProbability"], 0.55);
        assert_eq!(json["league"], "nba");
        // Kind-mismatched and local-only fields never appear.
        assert!(json.get("factorTexts").is_none());
        assert!(json.get("synced").is_none());
    }

    #[test]
    fn test_multi_payload_round_trips_to_domain() {
        let record = PredictionRecord::multi(
            vec![
                PredictionLeg::new("Lakers win", 0.6),
                PredictionLeg::new("Heat cover", 0.5),
            ],
            0.7,
        );
        let payload = PredictionPayload::from(&record);
        let rebuilt = PredictionRecord::try_from(payload).unwrap();

        assert_eq!(rebuilt.id, record.id);
        assert_eq!(rebuilt.kind(), PredictionKind::Multi);
        assert_eq!(rebuilt.factors, record.factors);
        assert!(rebuilt.synced, "pulled records are synced by definition");
    }

    #[test]
    fn test_history_response_deserialization() {
        let json = r#"{
            "predictions": [
                {
                    "id": "a4b54c1e-6c2f-4a0e-9c4e-3f5d2c1b0a99",
                    "kind": "single",
                    "factorText": "Lakers win",
                    "probability": 0.6,
                    "combinedProbability": 0.6,
                    "confidence": 0.8,
                    "createdAt": "2026-03-01T18:30:00Z",
                    "resolved": false,
                    "updateLog": [
                        { "at": "2026-03-01T19:00:00Z", "message": "odds moved -150 -> -110" }
                    ]
                }
            ]
        }"#;
        let resp: HistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.predictions.len(), 1);

        let record = PredictionRecord::try_from(resp.predictions[0].clone()).unwrap();
        assert_eq!(record.kind(), PredictionKind::Single);
        assert_eq!(record.update_log.len(), 1);
        assert!(record.league.is_none());
    }

    #[test]
    fn test_events_response_deserialization() {
        let json = r#"{
            "events": [
                { "type": "oddsChanged", "entity": "Lakers", "prevOdds": -150, "newOdds": -110 },
                { "type": "gameFinal", "home": "Lakers", "away": "Celtics",
                  "homeScore": 112, "awayScore": 104 }
            ],
            "cursor": 42
        }"#;
        let resp: EventsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.events.len(), 2);
        assert_eq!(resp.cursor, 42);
        assert!(matches!(resp.events[0], GameEvent::OddsChanged { .. }));
    }

    #[test]
    fn test_mismatched_multi_payload_is_rejected() {
        let json = r#"{
            "id": "a4b54c1e-6c2f-4a0e-9c4e-3f5d2c1b0a99",
            "kind": "multi",
            "factorTexts": ["Lakers win", "Heat cover"],
            "individualProbabilities": [0.6],
            "combinedProbability": 0.6,
            "confidence": 0.8,
            "createdAt": "2026-03-01T18:30:00Z"
        }"#;
        let payload: PredictionPayload = serde_json::from_str(json).unwrap();
        let err = PredictionRecord::try_from(payload).unwrap_err();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{
            "id": "a4b54c1e-6c2f-4a0e-9c4e-3f5d2c1b0a99",
            "kind": "teaser",
            "combinedProbability": 0.5,
            "confidence": 0.5,
            "createdAt": "2026-03-01T18:30:00Z"
        }"#;
        let payload: PredictionPayload = serde_json::from_str(json).unwrap();
        assert!(PredictionRecord::try_from(payload).is_err());
    }
}
