use async_trait::async_trait;

/// Port for the platform connectivity signal.
///
/// A probe answers "are we online right now". Errors and timeouts are
/// the adapter's to swallow; the monitor only ever sees a boolean, and
/// ambiguity must come back as `false` (fail-safe offline).
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Check connectivity once
    async fn check(&self) -> bool;
}
