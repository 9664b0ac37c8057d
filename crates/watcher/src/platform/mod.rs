//! Platform-specific file watching implementations
//!
//! Every backend implements [`WatcherBackend`]; [`default_backend`] picks the
//! one compiled for the current platform.

#[cfg(any(unix, windows))]
mod listener;
#[cfg(any(unix, windows))]
mod native;
pub mod stub;

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

use serde::{Deserialize, Serialize};
use std::fmt;
use vigil_core::{ChangeNotification, EventMask, WatchRequest};

pub use stub::StubBackend;

#[cfg(unix)]
pub use unix::UnixBackend;

#[cfg(windows)]
pub use windows::WindowsBackend;

/// Which backend implementation is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// ReadDirectoryChangesW
    Windows,
    /// inotify, FSEvents or kqueue
    Unix,
    /// No native support; every watch fails
    Stub,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Windows => "windows",
            BackendKind::Unix => "unix",
            BackendKind::Stub => "stub",
        };
        f.write_str(name)
    }
}

/// Lifecycle of a backend
///
/// `Starting` and `Stopping` are only held for the duration of a `watch()`
/// or `stop()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// A native change-notification mechanism
///
/// Construction never fails. Every fallible step reports through the return
/// value of the call: `false` from `watch()`, `None` from `poll()`.
pub trait WatcherBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Pre-warm the backend, resuming a retained watch if it was stopped
    fn start(&mut self);

    /// Halt the listener, release native resources and discard pending
    /// notifications. Idempotent; nothing is delivered afterwards.
    fn stop(&mut self);

    /// Replace any current watch with `request`
    ///
    /// Returns whether the new watch is established.
    fn watch(&mut self, request: WatchRequest) -> bool;

    /// Take the oldest pending notification without blocking
    fn poll(&mut self) -> Option<ChangeNotification>;

    fn state(&self) -> WatchState;

    /// Number of notifications waiting to be polled
    fn pending(&self) -> usize;

    /// Event bits this backend can observe
    fn supported_events(&self) -> EventMask;
}

/// Backend for the current platform
pub fn default_backend() -> Box<dyn WatcherBackend> {
    #[cfg(windows)]
    let backend: Box<dyn WatcherBackend> = Box::new(WindowsBackend::new());

    #[cfg(unix)]
    let backend: Box<dyn WatcherBackend> = Box::new(UnixBackend::new());

    #[cfg(not(any(unix, windows)))]
    let backend: Box<dyn WatcherBackend> = Box::new(StubBackend::new());

    backend
}

/// Backend by kind, falling back to the stub when `kind` is not compiled in
pub fn backend_for(kind: BackendKind) -> Box<dyn WatcherBackend> {
    match kind {
        #[cfg(windows)]
        BackendKind::Windows => Box::new(WindowsBackend::new()),
        #[cfg(unix)]
        BackendKind::Unix => Box::new(UnixBackend::new()),
        other => {
            if other != BackendKind::Stub {
                tracing::debug!(backend = %other, "backend not available on this platform, using stub");
            }
            Box::new(StubBackend::new())
        }
    }
}
