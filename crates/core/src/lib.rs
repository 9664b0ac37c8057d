//! Shared data model for Vigil
//!
//! This crate provides:
//! - Event masks and watch options
//! - Change notifications
//! - Change signatures for poll-based detection

pub mod event;
pub mod signature;

// Re-exports
pub use event::{
    ChangeKind, ChangeNotification, EventMask, WatchOptions, WatchRequest, DEFAULT_BUFFER_SIZE,
};
pub use signature::{ChangeSignature, Observation};
