//! File change detection for Vigil
//!
//! This crate provides:
//! - [`FileWatcher`], an event-driven watch over one file or directory,
//!   backed by the platform's native notification mechanism
//! - [`PollingDetector`], a "did this file change since last time" check
//! - [`PeriodicPoller`], a set of detectors driven on an interval
//! - Per-path debouncing and scope filtering of native events
//! - Rearming of native handles invalidated by the OS

pub mod config;
pub mod debounce;
pub mod error;
pub mod periodic;
pub mod platform;
pub mod poller;
pub mod queue;
pub mod services;
pub mod translate;

use std::path::PathBuf;
use tracing::debug;
use vigil_core::{ChangeNotification, EventMask, WatchOptions, WatchRequest};

pub use config::{example_config, WatcherConfig};
pub use error::{ConfigError, WatchError};
pub use periodic::PeriodicPoller;
pub use platform::{BackendKind, WatchState, WatcherBackend};
pub use poller::PollingDetector;
pub use queue::NotificationQueue;

/// Watches one file or directory at a time
///
/// Notifications are collected in the background and handed out by
/// [`poll`](Self::poll). Dropping the watcher stops it.
pub struct FileWatcher {
    backend: Box<dyn WatcherBackend>,
    honored: EventMask,
}

impl FileWatcher {
    /// Watcher on the platform's native backend
    pub fn new() -> Self {
        Self::with_backend(platform::default_backend())
    }

    pub fn with_backend(backend: Box<dyn WatcherBackend>) -> Self {
        Self {
            backend,
            honored: EventMask::empty(),
        }
    }

    /// Watcher on the backend named in `config`, or the platform default
    pub fn from_config(config: &WatcherConfig) -> Self {
        let backend = config
            .backend
            .map(platform::backend_for)
            .unwrap_or_else(platform::default_backend);
        Self::with_backend(backend)
    }

    /// Pre-warm the backend, resuming a watch halted by [`stop`](Self::stop)
    pub fn start(&mut self) {
        self.backend.start();
    }

    /// Halt delivery and discard anything pending. Idempotent.
    pub fn stop(&mut self) {
        self.backend.stop();
    }

    /// Replace the current watch, if any, with one on `path`
    ///
    /// Notifications queued for the previous target are discarded first.
    /// Returns whether the new watch is established; event classes the
    /// backend cannot observe are dropped (see [`honored_events`](Self::honored_events)).
    pub fn watch(&mut self, path: impl Into<PathBuf>, events: EventMask, options: WatchOptions) -> bool {
        self.backend.stop();

        let request = WatchRequest::new(path, events, options);
        let established = self.backend.watch(request);

        self.honored = if established {
            events & self.backend.supported_events()
        } else {
            EventMask::empty()
        };

        let dropped = events - self.honored;
        if established && !dropped.is_empty() {
            debug!(backend = %self.backend.kind(), ?dropped, "event classes not observable");
        }

        established
    }

    /// Oldest pending notification, without blocking
    pub fn poll(&mut self) -> Option<ChangeNotification> {
        self.backend.poll()
    }

    /// Everything pending, oldest first
    pub fn drain(&mut self) -> Vec<ChangeNotification> {
        std::iter::from_fn(|| self.backend.poll()).collect()
    }

    pub fn pending(&self) -> usize {
        self.backend.pending()
    }

    pub fn state(&self) -> WatchState {
        self.backend.state()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Event classes the current watch reports; empty when not watching
    pub fn honored_events(&self) -> EventMask {
        self.honored
    }

    pub fn supported_events(&self) -> EventMask {
        self.backend.supported_events()
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.backend.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use vigil_core::ChangeKind;

    #[derive(Default)]
    struct Calls {
        log: Vec<&'static str>,
        requests: Vec<WatchRequest>,
    }

    /// Scripted backend: `watch` succeeds unless the path is "reject"
    struct FakeBackend {
        calls: Arc<Mutex<Calls>>,
        queue: VecDeque<ChangeNotification>,
        state: WatchState,
    }

    impl FakeBackend {
        fn new(calls: Arc<Mutex<Calls>>) -> Self {
            Self {
                calls,
                queue: VecDeque::new(),
                state: WatchState::Idle,
            }
        }
    }

    impl WatcherBackend for FakeBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Stub
        }

        fn start(&mut self) {
            self.calls.lock().log.push("start");
        }

        fn stop(&mut self) {
            self.calls.lock().log.push("stop");
            self.queue.clear();
            self.state = WatchState::Idle;
        }

        fn watch(&mut self, request: WatchRequest) -> bool {
            let ok = request.path.as_os_str() != "reject";
            let mut calls = self.calls.lock();
            calls.log.push("watch");
            if ok {
                self.state = WatchState::Running;
                for name in ["n1", "n2", "n3"] {
                    self.queue
                        .push_back(ChangeNotification::new(ChangeKind::Modified, request.path.join(name)));
                }
            }
            calls.requests.push(request);
            ok
        }

        fn poll(&mut self) -> Option<ChangeNotification> {
            self.queue.pop_front()
        }

        fn state(&self) -> WatchState {
            self.state
        }

        fn pending(&self) -> usize {
            self.queue.len()
        }

        fn supported_events(&self) -> EventMask {
            EventMask::NAME_CHANGES | EventMask::LAST_WRITE
        }
    }

    fn fake() -> (FileWatcher, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let watcher = FileWatcher::with_backend(Box::new(FakeBackend::new(Arc::clone(&calls))));
        (watcher, calls)
    }

    #[test]
    fn test_watch_stops_before_replacing() {
        let (mut watcher, calls) = fake();

        assert!(watcher.watch("/first", EventMask::all(), WatchOptions::default()));
        assert!(watcher.watch("/second", EventMask::all(), WatchOptions::default()));

        let calls = calls.lock();
        assert_eq!(calls.log, vec!["stop", "watch", "stop", "watch"]);
        assert_eq!(calls.requests[1].path, PathBuf::from("/second"));
    }

    #[test]
    fn test_poll_is_fifo_then_none() {
        let (mut watcher, _calls) = fake();
        assert!(watcher.watch("/dir", EventMask::all(), WatchOptions::default()));
        assert_eq!(watcher.pending(), 3);

        let paths: Vec<_> = watcher.drain().into_iter().map(|n| n.path).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/dir/n1"), PathBuf::from("/dir/n2"), PathBuf::from("/dir/n3")]
        );
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn test_honored_events_are_intersected() {
        let (mut watcher, _calls) = fake();

        assert!(watcher.watch("/dir", EventMask::all(), WatchOptions::default()));
        assert_eq!(
            watcher.honored_events(),
            EventMask::FILE_NAME | EventMask::DIR_NAME | EventMask::LAST_WRITE
        );

        assert!(!watcher.watch("reject", EventMask::all(), WatchOptions::default()));
        assert!(watcher.honored_events().is_empty());
        assert!(watcher.poll().is_none());
    }

    #[test]
    fn test_options_pass_through() {
        let (mut watcher, calls) = fake();
        let options = WatchOptions {
            recursive: true,
            buffer_size: 4096,
            ..WatchOptions::default()
        };
        assert!(watcher.watch("/dir", EventMask::SIZE, options));

        let calls = calls.lock();
        assert_eq!(calls.requests[0].options, options);
        assert_eq!(calls.requests[0].events, EventMask::SIZE);
    }

    #[test]
    fn test_drop_stops_backend() {
        let (mut watcher, calls) = fake();
        watcher.start();
        drop(watcher);

        assert_eq!(calls.lock().log, vec!["start", "stop"]);
    }

    #[test]
    fn test_from_config_honors_backend_override() {
        let config = WatcherConfig {
            backend: Some(BackendKind::Stub),
            ..WatcherConfig::default()
        };
        let mut watcher = FileWatcher::from_config(&config);
        assert_eq!(watcher.backend_kind(), BackendKind::Stub);
        assert!(!watcher.watch(".", EventMask::all(), config.watch_options()));
        assert_eq!(watcher.state(), WatchState::Idle);
    }
}
