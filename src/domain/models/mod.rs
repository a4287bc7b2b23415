pub mod config;
pub mod connectivity;
pub mod game_event;
pub mod prediction;

pub use config::Config;
pub use connectivity::{ConnectivityState, ConnectivityTransition};
pub use game_event::{GameEvent, PlayerStatus};
pub use prediction::{
    clamp_probability, PredictionFactors, PredictionKind, PredictionLeg, PredictionRecord,
    Resolution, UpdateLogEntry, MAX_LEGS,
};
