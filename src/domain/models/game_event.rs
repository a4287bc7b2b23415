//! Push-event model.
//!
//! The transport delivers five event kinds as games progress. Only odds
//! moves, player status changes, and finals carry mutation rules; game
//! starts and score updates are consumed for display and logging only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster status of a player as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Questionable,
    Doubtful,
    Out,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Questionable => "questionable",
            Self::Doubtful => "doubtful",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed push event from the live feed.
///
/// Odds are American ("moneyline") integers: -150 means risk 150 to win
/// 100, +200 means risk 100 to win 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    /// A game tipped off. No mutation rule.
    #[serde(rename_all = "camelCase")]
    GameStarted { home: String, away: String },

    /// In-game score change. No mutation rule.
    #[serde(rename_all = "camelCase")]
    ScoreUpdate {
        home: String,
        away: String,
        home_score: u32,
        away_score: u32,
        /// Quarter/period/inning as the feed reports it.
        period: u32,
    },

    /// Market odds moved for a team or player market.
    #[serde(rename_all = "camelCase")]
    OddsChanged {
        /// Team or player the market refers to.
        entity: String,
        prev_odds: i32,
        new_odds: i32,
    },

    /// A player's roster status changed.
    #[serde(rename_all = "camelCase")]
    PlayerStatusChanged {
        player: String,
        prev_status: PlayerStatus,
        new_status: PlayerStatus,
    },

    /// A game went final.
    #[serde(rename_all = "camelCase")]
    GameFinal {
        home: String,
        away: String,
        home_score: u32,
        away_score: u32,
    },
}

impl GameEvent {
    /// Short tag for logging and display.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "game_started",
            Self::ScoreUpdate { .. } => "score_update",
            Self::OddsChanged { .. } => "odds_changed",
            Self::PlayerStatusChanged { .. } => "player_status_changed",
            Self::GameFinal { .. } => "game_final",
        }
    }

    /// Whether this event kind can mutate stored records at all.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            Self::OddsChanged { .. } | Self::PlayerStatusChanged { .. } | Self::GameFinal { .. }
        )
    }

    /// One-line human-readable description, used for `update_log` entries
    /// and the watch display.
    pub fn describe(&self) -> String {
        match self {
            Self::GameStarted { home, away } => format!("{away} at {home} tipped off"),
            Self::ScoreUpdate {
                home,
                away,
                home_score,
                away_score,
                period,
            } => format!("{away} {away_score} - {home_score} {home} (period {period})"),
            Self::OddsChanged {
                entity,
                prev_odds,
                new_odds,
            } => format!("{entity} odds moved {prev_odds:+} -> {new_odds:+}"),
            Self::PlayerStatusChanged {
                player,
                prev_status,
                new_status,
            } => format!("{player} status {prev_status} -> {new_status}"),
            Self::GameFinal {
                home,
                away,
                home_score,
                away_score,
            } => format!("final: {away} {away_score} - {home_score} {home}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_status_wire_names_are_snake_case() {
        let status: PlayerStatus = serde_json::from_str("\"questionable\"").unwrap();
        assert_eq!(status, PlayerStatus::Questionable);
        assert!(serde_json::from_str::<PlayerStatus>("\"benched\"").is_err());
    }

    #[test]
    fn test_event_wire_shape_is_tagged_camel_case() {
        let event = GameEvent::OddsChanged {
            entity: "Lakers".to_string(),
            prev_odds: -150,
            new_odds: -110,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "oddsChanged");
        assert_eq!(json["prevOdds"], -150);
        assert_eq!(json["newOdds"], -110);

        let parsed: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_actionable_kinds() {
        let started = GameEvent::GameStarted {
            home: "Lakers".into(),
            away: "Celtics".into(),
        };
        assert!(!started.is_actionable());

        let final_event = GameEvent::GameFinal {
            home: "Lakers".into(),
            away: "Celtics".into(),
            home_score: 112,
            away_score: 104,
        };
        assert!(final_event.is_actionable());
        assert_eq!(final_event.kind(), "game_final");
    }

    #[test]
    fn test_describe_is_stable() {
        let event = GameEvent::PlayerStatusChanged {
            player: "Smith".into(),
            prev_status: PlayerStatus::Active,
            new_status: PlayerStatus::Out,
        };
        assert_eq!(event.describe(), "Smith status active -> out");
    }
}
