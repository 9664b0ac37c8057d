//! CLI command implementations

pub mod config;
pub mod poll;
pub mod watch;
