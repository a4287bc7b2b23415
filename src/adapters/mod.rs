//! Infrastructure adapters for external systems.

pub mod remote;
pub mod sqlite;
