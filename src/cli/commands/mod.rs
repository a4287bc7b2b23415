//! CLI command implementations.

pub mod add;
pub mod clear;
pub mod current;
pub mod delete;
pub mod init;
pub mod list;
pub mod show;
pub mod stats;
pub mod sync;
pub mod watch;
