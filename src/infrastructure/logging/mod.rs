//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - `EnvFilter` honoring `RUST_LOG` overrides
//! - pretty or JSON console output on stderr
//! - optional daily-rolling JSON file output

pub mod logger;

pub use logger::Logger;
