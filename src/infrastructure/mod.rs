//! Infrastructure layer module
//!
//! Cross-cutting concerns behind the domain and service layers:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
