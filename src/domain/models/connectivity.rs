//! Connectivity state model.
//!
//! A single process-wide value owned by the connectivity monitor and
//! read by the sync coordinator and the live event transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current connectivity mode. There is no intermediate state: an
/// ambiguous platform signal is treated as `Offline` until a probe
/// proves otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        // Fail-safe: assume offline until proven online.
        Self::Offline
    }
}

impl ConnectivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted on every state change, exactly once per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityTransition {
    CameOnline,
    WentOffline,
}
