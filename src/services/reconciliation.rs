//! Live reconciliation of stored predictions against push events.
//!
//! The policy functions here are pure `(record, event) -> Option<record>`
//! transforms, unit-testable with no transport or persistence. The
//! [`ReconciliationEngine`] wraps them in a bus-consuming task that
//! writes every mutation back through the store.
//!
//! Three event kinds mutate records. An odds move shifts matching
//! probabilities by the implied-probability delta, a player going out
//! penalizes matching probabilities, and a final score appends to the
//! log and may resolve an unambiguous claim. Resolved records are inert.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::models::config::ReconciliationPolicy;
use crate::domain::models::{
    clamp_probability, GameEvent, PlayerStatus, PredictionFactors, PredictionRecord,
};
use crate::domain::ports::PredictionFilters;
use crate::services::event_bus::{GameEventBus, SequencedEvent};
use crate::services::store::PredictionStore;

/// Tokens that mark a win claim.
const WIN_KEYWORDS: &[&str] = &["win", "wins", "beat", "beats"];

/// Tokens that qualify a claim beyond a plain "X wins", making it
/// ambiguous for auto-resolution (margins, spreads, totals).
const QUALIFIER_TOKENS: &[&str] = &["by", "over", "under", "spread", "total", "points", "pts"];

/// Which of the two teams an unambiguous win claim names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimedWinner {
    Home,
    Away,
}

/// Probability implied by American odds.
///
/// Negative odds `|o| / (|o| + 100)`, non-negative `100 / (o + 100)`.
/// -150 reads 0.60, -110 reads ~0.5238, +200 reads 0.333...
pub fn implied_probability(odds: i32) -> f64 {
    let o = f64::from(odds);
    if odds < 0 {
        -o / (-o + 100.0)
    } else {
        100.0 / (o + 100.0)
    }
}

/// Lowercase and strip to alphanumeric words.
pub fn normalize_text(value: &str) -> String {
    value
        .to_ascii_lowercase()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { ' ' })
        .collect::<String>()
}

/// Whether a factor text refers to an entity (team or player).
///
/// Case-insensitive containment of the full entity phrase, or a shared
/// word of length >= 3 ("Los Angeles Lakers" matches a "Lakers win"
/// factor; the two-letter "LA" alone does not).
pub fn matches_entity(text: &str, entity: &str) -> bool {
    let text_norm = normalize_text(text);
    let entity_norm = normalize_text(entity);

    let entity_phrase = entity_norm.split_whitespace().collect::<Vec<_>>().join(" ");
    if entity_phrase.is_empty() {
        return false;
    }

    let text_phrase = text_norm.split_whitespace().collect::<Vec<_>>().join(" ");
    if text_phrase.contains(&entity_phrase) {
        return true;
    }

    entity_norm
        .split_whitespace()
        .filter(|token| token.len() >= 3)
        .any(|token| text_norm.split_whitespace().any(|word| word == token))
}

/// Classify a factor text as an unambiguous win claim for one team.
///
/// `Some` only when the text names exactly one of the two teams, carries
/// a win keyword, and has no qualifying token (margin, spread, total).
/// "Lakers win" classifies; "Lakers win by 10" and "Celtics beat Lakers"
/// do not.
pub fn classify_win_claim(text: &str, home: &str, away: &str) -> Option<ClaimedWinner> {
    let normalized = normalize_text(text);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    if !tokens.iter().any(|t| WIN_KEYWORDS.contains(t)) {
        return None;
    }

    let qualified = tokens
        .iter()
        .any(|t| QUALIFIER_TOKENS.contains(t) || t.chars().all(|c| c.is_ascii_digit()));
    if qualified {
        return None;
    }

    match (matches_entity(text, home), matches_entity(text, away)) {
        (true, false) => Some(ClaimedWinner::Home),
        (false, true) => Some(ClaimedWinner::Away),
        _ => None,
    }
}

/// Apply one event to one record.
///
/// Pure transform: `None` when the event does not touch the record
/// (including every event against a resolved record). `Some` carries a
/// full updated copy with `synced` reset to false.
pub fn apply_event(
    record: &PredictionRecord,
    event: &GameEvent,
    policy: &ReconciliationPolicy,
) -> Option<PredictionRecord> {
    if record.resolved {
        return None;
    }

    match event {
        GameEvent::OddsChanged {
            entity,
            prev_odds,
            new_odds,
        } => apply_odds_change(record, event, entity, *prev_odds, *new_odds, policy),
        GameEvent::PlayerStatusChanged {
            player,
            prev_status,
            new_status,
        } => apply_player_status(record, event, player, *prev_status, *new_status, policy),
        GameEvent::GameFinal {
            home,
            away,
            home_score,
            away_score,
        } => apply_game_final(record, event, home, away, *home_score, *away_score),
        // Game starts and score updates carry no mutation rule.
        GameEvent::GameStarted { .. } | GameEvent::ScoreUpdate { .. } => None,
    }
}

fn apply_odds_change(
    record: &PredictionRecord,
    event: &GameEvent,
    entity: &str,
    prev_odds: i32,
    new_odds: i32,
    policy: &ReconciliationPolicy,
) -> Option<PredictionRecord> {
    let delta = implied_probability(new_odds) - implied_probability(prev_odds);
    if delta.abs() < policy.min_odds_delta {
        return None;
    }

    let mut updated = record.clone();
    let touched = adjust_matching_probabilities(&mut updated.factors, entity, |p| p + delta);
    if touched == 0 {
        return None;
    }

    updated.log_update(format!("{} (delta {:+.3})", event.describe(), delta));
    updated.synced = false;
    Some(updated)
}

fn apply_player_status(
    record: &PredictionRecord,
    event: &GameEvent,
    player: &str,
    prev_status: PlayerStatus,
    new_status: PlayerStatus,
    policy: &ReconciliationPolicy,
) -> Option<PredictionRecord> {
    if !mentions_entity(&record.factors, player) {
        return None;
    }

    let mut updated = record.clone();

    if prev_status == PlayerStatus::Active && new_status == PlayerStatus::Out {
        adjust_matching_probabilities(&mut updated.factors, player, |p| p * policy.out_penalty);
        updated.log_update(format!(
            "{} (probability x{:.2})",
            event.describe(),
            policy.out_penalty
        ));
    } else {
        updated.log_update(event.describe());
    }

    updated.synced = false;
    Some(updated)
}

fn apply_game_final(
    record: &PredictionRecord,
    event: &GameEvent,
    home: &str,
    away: &str,
    home_score: u32,
    away_score: u32,
) -> Option<PredictionRecord> {
    let mentions_game =
        mentions_entity(&record.factors, home) || mentions_entity(&record.factors, away);
    if !mentions_game {
        return None;
    }

    let mut updated = record.clone();
    updated.log_update(event.describe());

    // Draws have no winner; the record stays open.
    let winner = match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => Some(ClaimedWinner::Home),
        std::cmp::Ordering::Less => Some(ClaimedWinner::Away),
        std::cmp::Ordering::Equal => None,
    };

    if let Some(winner) = winner {
        let summary = format!("{home} {home_score}-{away_score} {away}");
        match &updated.factors {
            PredictionFactors::Single { factor_text, .. } => {
                if let Some(claimed) = classify_win_claim(factor_text, home, away) {
                    updated.resolve(claimed == winner, summary).ok();
                }
            }
            PredictionFactors::Multi { legs } => {
                // One leg claiming the loser settles the whole parlay as
                // incorrect; claiming the winner settles nothing (the
                // other legs stay unknown).
                let claims_loser = legs.iter().any(|leg| {
                    classify_win_claim(&leg.factor_text, home, away)
                        .is_some_and(|claimed| claimed != winner)
                });
                if claims_loser {
                    updated.resolve(false, summary).ok();
                }
            }
        }
    }

    updated.synced = false;
    Some(updated)
}

/// Apply `adjust` (then clamp) to every probability field whose factor
/// text matches the entity. Returns how many fields changed.
fn adjust_matching_probabilities(
    factors: &mut PredictionFactors,
    entity: &str,
    adjust: impl Fn(f64) -> f64,
) -> usize {
    match factors {
        PredictionFactors::Single {
            factor_text,
            probability,
        } => {
            if matches_entity(factor_text, entity) {
                *probability = clamp_probability(adjust(*probability));
                1
            } else {
                0
            }
        }
        PredictionFactors::Multi { legs } => legs
            .iter_mut()
            .filter(|leg| matches_entity(&leg.factor_text, entity))
            .map(|leg| {
                leg.probability = clamp_probability(adjust(leg.probability));
            })
            .count(),
    }
}

fn mentions_entity(factors: &PredictionFactors, entity: &str) -> bool {
    factors
        .factor_texts()
        .iter()
        .any(|text| matches_entity(text, entity))
}

/// Bus-consuming engine task.
///
/// Consumes events in arrival order. For each actionable event it loads
/// up to `scan_limit` unresolved records, applies the pure transform,
/// and writes every mutation back through the store (which refreshes
/// the projector via the observer hook before returning).
pub struct ReconciliationEngine {
    store: Arc<PredictionStore>,
    policy: ReconciliationPolicy,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<PredictionStore>, policy: ReconciliationPolicy) -> Self {
        Self { store, policy }
    }

    /// Spawn the consuming loop until `shutdown` fires.
    ///
    /// Subscribes before spawning, so events published after this
    /// returns are never missed.
    pub fn start(
        &self,
        bus: &GameEventBus,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let store = self.store.clone();
        let policy = self.policy.clone();
        let mut events = bus.subscribe();

        tokio::spawn(async move {
            tracing::info!(
                scan_limit = policy.scan_limit,
                "started reconciliation engine"
            );

            loop {
                tokio::select! {
                    next = events.recv() => {
                        match next {
                            Ok(sequenced) => {
                                Self::handle_event(&store, &policy, &sequenced).await;
                            }
                            Err(broadcast::error::RecvError::Lagged(missed)) => {
                                tracing::warn!(
                                    missed = missed,
                                    "reconciliation engine lagged behind the event bus"
                                );
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                tracing::info!("event bus closed, stopping reconciliation engine");
                                break;
                            }
                        }
                    }

                    _ = shutdown.recv() => {
                        tracing::info!("reconciliation engine shutting down");
                        break;
                    }
                }
            }
        })
    }

    async fn handle_event(
        store: &PredictionStore,
        policy: &ReconciliationPolicy,
        sequenced: &SequencedEvent,
    ) {
        let event = &sequenced.event;
        if !event.is_actionable() {
            tracing::debug!(
                sequence = sequenced.sequence.0,
                kind = event.kind(),
                "event carries no mutation rule"
            );
            return;
        }

        let candidates = match store
            .list_recent(PredictionFilters::unresolved(policy.scan_limit))
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    sequence = sequenced.sequence.0,
                    error = %e,
                    "failed to load reconciliation candidates"
                );
                return;
            }
        };

        let mut mutated = 0usize;
        for record in &candidates {
            if let Some(updated) = apply_event(record, event, policy) {
                match store.put(updated).await {
                    Ok(_) => mutated += 1,
                    Err(e) => {
                        tracing::warn!(
                            id = %record.id,
                            error = %e,
                            "failed to persist reconciled record"
                        );
                    }
                }
            }
        }

        tracing::info!(
            sequence = sequenced.sequence.0,
            kind = event.kind(),
            scanned = candidates.len(),
            mutated = mutated,
            "reconciled game event"
        );
    }
}
