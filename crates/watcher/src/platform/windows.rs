//! Windows-native backend (ReadDirectoryChangesW)
//!
//! Directory handles opened by path stay valid across renames of their
//! contents, so there is no rearm policy here. Only directories can be
//! watched. The native buffer hint is accepted but notify sizes its own
//! buffer.

use super::native::NativeWatch;
use super::{BackendKind, WatchState, WatcherBackend};
use notify::ReadDirectoryChangesWatcher;
use tracing::trace;
use vigil_core::{ChangeNotification, EventMask, WatchRequest, DEFAULT_BUFFER_SIZE};

/// Change classes notify passes to ReadDirectoryChangesW
///
/// Last-access changes are not part of its filter.
fn native_events() -> EventMask {
    EventMask::all() - EventMask::LAST_ACCESS
}

pub struct WindowsBackend {
    watch: NativeWatch,
}

impl WindowsBackend {
    pub fn new() -> Self {
        Self {
            watch: NativeWatch::new(native_events(), true),
        }
    }
}

impl Default for WindowsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WatcherBackend for WindowsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Windows
    }

    fn start(&mut self) {
        self.watch.resume::<ReadDirectoryChangesWatcher>(None);
    }

    fn stop(&mut self) {
        self.watch.teardown(true);
    }

    fn watch(&mut self, request: WatchRequest) -> bool {
        if request.options.buffer_size != DEFAULT_BUFFER_SIZE {
            trace!(buffer_size = request.options.buffer_size, "buffer hint ignored");
        }

        self.stop();
        self.watch.replace::<ReadDirectoryChangesWatcher>(request, None)
    }

    fn poll(&mut self) -> Option<ChangeNotification> {
        self.watch.poll()
    }

    fn state(&self) -> WatchState {
        self.watch.state()
    }

    fn pending(&self) -> usize {
        self.watch.queue().len()
    }

    fn supported_events(&self) -> EventMask {
        self.watch.supported()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;
    use vigil_core::WatchOptions;

    #[test]
    fn test_supported_events_exclude_last_access() {
        let supported = WindowsBackend::new().supported_events();
        assert!(!supported.contains(EventMask::LAST_ACCESS));
        assert!(supported.contains(EventMask::CREATION | EventMask::SECURITY | EventMask::SIZE));
    }

    #[test]
    fn test_requires_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();

        let mut backend = WindowsBackend::new();
        assert!(!backend.watch(WatchRequest::new(&file, EventMask::all(), WatchOptions::default())));
        assert!(backend.watch(WatchRequest::new(
            temp_dir.path(),
            EventMask::all(),
            WatchOptions::default()
        )));
        assert_eq!(backend.state(), WatchState::Running);
    }

    #[test]
    fn test_reports_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        let mut backend = WindowsBackend::new();
        assert!(backend.watch(WatchRequest::new(&root, EventMask::all(), WatchOptions::default())));

        fs::write(root.join("created.txt"), b"hello").unwrap();

        let start = Instant::now();
        let mut seen = false;
        while start.elapsed() < Duration::from_secs(5) && !seen {
            while let Some(n) = backend.poll() {
                seen |= n.path.ends_with("created.txt");
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert!(seen);

        backend.stop();
        assert!(backend.poll().is_none());
    }
}
