//! Domain errors for the tipsheet store.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors. Nothing here is fatal to the process: every
/// failure degrades to a record staying local, unsynced, or unresolved,
/// and the operation is retried on its next trigger.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Prediction not found: {0}")]
    PredictionNotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Transient by definition; surfaces to users only as a persistent
    /// `synced = false` flag on the affected records.
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Event transport closed: {0}")]
    TransportClosed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::NetworkError(err.to_string())
    }
}

impl DomainError {
    /// Whether the failure is transient and worth retrying on the next
    /// sync trigger.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::TransportClosed(_))
    }
}
