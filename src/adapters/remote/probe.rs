//! HTTP connectivity probe.
//!
//! Answers "are we online" by hitting the remote's health endpoint.
//! Every failure mode collapses to `false`: the monitor must never see
//! an ambiguous answer, and offline is the safe default.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::ports::ConnectivityProbe;

/// Probe that issues `GET /health` with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpConnectivityProbe {
    http: Client,
    health_url: String,
    timeout: Duration,
}

impl HttpConnectivityProbe {
    /// Create a probe against `<base_url>/health`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            health_url: format!("{}/health", base_url.trim_end_matches('/')),
            timeout,
        }
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn check(&self) -> bool {
        let request = self.http.get(&self.health_url).send();

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(resp)) => resp.status().is_success(),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "health probe request failed");
                false
            }
            Err(_) => {
                tracing::debug!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "health probe timed out"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_healthy_endpoint_reads_online() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;

        let probe = HttpConnectivityProbe::new(&server.url(), Duration::from_secs(2));
        assert!(probe.check().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_reads_offline() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let probe = HttpConnectivityProbe::new(&server.url(), Duration::from_secs(2));
        assert!(!probe.check().await);
    }

    #[tokio::test]
    async fn test_unreachable_host_reads_offline() {
        // Nothing listens on this port.
        let probe = HttpConnectivityProbe::new("http://127.0.0.1:1", Duration::from_millis(500));
        assert!(!probe.check().await);
    }
}
