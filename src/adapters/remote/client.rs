//! Remote prediction service HTTP client with rate limiting.
//!
//! Wraps the dashboard's REST API, providing typed methods for the
//! operations the sync coordinator and polling transport use. Includes
//! a token-bucket rate limiter so a large unsynced backlog cannot
//! hammer the remote.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::config::RemoteConfig;
use crate::domain::models::PredictionRecord;
use crate::domain::ports::{EventBatch, RemoteService};

use super::models::{EventsResponse, HistoryResponse, PredictionPayload};

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens in the bucket.
    capacity: u32,
    /// Current available tokens.
    tokens: u32,
    /// Duration of the refill window.
    window: Duration,
    /// When the current window started.
    window_start: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the given capacity and window.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Acquire a single token, sleeping if necessary.
    pub async fn acquire(&mut self) {
        if self.window_start.elapsed() >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens == 0 {
            let remaining = self.window.saturating_sub(self.window_start.elapsed());
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "remote rate limit exhausted, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        self.tokens -= 1;
    }
}

/// HTTP client for the remote prediction service.
///
/// All failures map to [`DomainError::NetworkError`], which the sync
/// coordinator treats as transient: log, skip, retry on the next
/// trigger. A malformed but successful response is the one exception
/// and surfaces as a serialization error.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    /// The underlying HTTP client, carrying the request timeout.
    http: Client,
    /// Service base URL without a trailing slash.
    base_url: String,
    /// Optional bearer token for the remote API.
    api_key: Option<String>,
    /// Shared rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl RemoteClient {
    /// Create a client from the remote section of the config.
    pub fn new(config: &RemoteConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DomainError::NetworkError(format!("http client build failed: {e}")))?;

        let rate_limiter = RateLimiter::new(
            config.rate_limit_per_minute,
            Duration::from_secs(60),
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }

    /// Acquire a rate-limit token and build an authorized request.
    async fn rate_limited_request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> reqwest::RequestBuilder {
        self.rate_limiter.lock().await.acquire().await;
        let mut req = self
            .http
            .request(method, url)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        req
    }

    /// Check a response status, turning non-2xx into a transient error.
    async fn fail_on_status(
        resp: reqwest::Response,
        what: &str,
    ) -> DomainResult<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(DomainError::NetworkError(format!(
            "{what} returned {status}: {body}"
        )))
    }
}

#[async_trait::async_trait]
impl RemoteService for RemoteClient {
    async fn create(&self, record: &PredictionRecord) -> DomainResult<()> {
        let url = format!("{}/predictions", self.base_url);
        let payload = PredictionPayload::from(record);

        let resp = self
            .rate_limited_request(reqwest::Method::POST, &url)
            .await
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::NetworkError(format!("create request failed: {e}")))?;

        Self::fail_on_status(resp, "create").await?;
        Ok(())
    }

    async fn push(&self, record: &PredictionRecord) -> DomainResult<()> {
        let url = format!("{}/predictions/sync", self.base_url);
        let payload = PredictionPayload::from(record);

        let resp = self
            .rate_limited_request(reqwest::Method::POST, &url)
            .await
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::NetworkError(format!("push request failed: {e}")))?;

        Self::fail_on_status(resp, "push").await?;
        Ok(())
    }

    async fn pull_history(&self, limit: u32) -> DomainResult<Vec<PredictionRecord>> {
        let url = format!("{}/predictions?limit={}", self.base_url, limit);

        let resp = self
            .rate_limited_request(reqwest::Method::GET, &url)
            .await
            .send()
            .await
            .map_err(|e| DomainError::NetworkError(format!("pull_history request failed: {e}")))?;

        let resp = Self::fail_on_status(resp, "pull_history").await?;
        let history = resp.json::<HistoryResponse>().await.map_err(|e| {
            DomainError::SerializationError(format!("pull_history parse failed: {e}"))
        })?;

        history
            .predictions
            .into_iter()
            .map(PredictionRecord::try_from)
            .collect()
    }

    async fn poll_events(&self, cursor: u64) -> DomainResult<EventBatch> {
        let url = format!("{}/events?since={}", self.base_url, cursor);

        let resp = self
            .rate_limited_request(reqwest::Method::GET, &url)
            .await
            .send()
            .await
            .map_err(|e| DomainError::NetworkError(format!("poll_events request failed: {e}")))?;

        let resp = Self::fail_on_status(resp, "poll_events").await?;
        let page = resp.json::<EventsResponse>().await.map_err(|e| {
            DomainError::SerializationError(format!("poll_events parse failed: {e}"))
        })?;

        Ok(EventBatch {
            events: page.events,
            cursor: page.cursor,
        })
    }
}
