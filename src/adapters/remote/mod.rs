//! Remote prediction service adapters.
//!
//! HTTP client for the dashboard API, the event transports that feed
//! the bus, and the connectivity probe.

pub mod client;
pub mod models;
pub mod probe;
pub mod transport;

pub use client::{RateLimiter, RemoteClient};
pub use models::{EventsResponse, HistoryResponse, PredictionPayload};
pub use probe::HttpConnectivityProbe;
pub use transport::{ChannelEventTransport, PollingEventTransport};
