//! Unix event-native backend
//!
//! inotify on Linux, FSEvents on macOS, kqueue on the BSDs, all through
//! `notify::RecommendedWatcher`. A flat watch may target a file or a
//! directory; a recursive watch needs a directory.
//!
//! Some of these primitives bind to an inode rather than a path, so they go
//! silent once the watched root is removed or renamed. The listener raises
//! `needs_rearm` when it sees that happen, and the next detection cycle
//! (`poll()` or `start()`) reopens the handle if the target is back.

use super::native::NativeWatch;
use super::{BackendKind, WatchState, WatcherBackend};
use notify::RecommendedWatcher;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;
use vigil_core::{ChangeNotification, EventMask, WatchRequest};

/// Event bits the platform's native primitive can report
///
/// None of them report plain reads, so `LAST_ACCESS` is never honored.
fn native_events() -> EventMask {
    if cfg!(any(target_os = "linux", target_os = "android", target_os = "macos")) {
        EventMask::all() - EventMask::CREATION - EventMask::LAST_ACCESS
    } else {
        EventMask::NAME_CHANGES | EventMask::ATTRIBUTES | EventMask::SIZE | EventMask::LAST_WRITE
    }
}

pub struct UnixBackend {
    watch: NativeWatch,
    needs_rearm: Arc<AtomicBool>,
}

impl UnixBackend {
    pub fn new() -> Self {
        Self {
            watch: NativeWatch::new(native_events(), false),
            needs_rearm: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a rearm is pending for the next detection cycle
    pub fn needs_rearm(&self) -> bool {
        self.needs_rearm.load(Ordering::Acquire)
    }

    fn flag(&self) -> Option<Arc<AtomicBool>> {
        Some(Arc::clone(&self.needs_rearm))
    }

    /// Start of a detection cycle: act on a pending rearm
    fn rearm_if_needed(&mut self) {
        if !self.needs_rearm.swap(false, Ordering::AcqRel) {
            return;
        }

        if self.watch.request().is_none() {
            return;
        }

        if let Err(e) = self.watch.rearm::<RecommendedWatcher>(self.flag()) {
            trace!(error = %e, "rearm deferred");
            self.needs_rearm.store(true, Ordering::Release);
        }
    }
}

impl Default for UnixBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WatcherBackend for UnixBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Unix
    }

    fn start(&mut self) {
        self.rearm_if_needed();
        let flag = self.flag();
        self.watch.resume::<RecommendedWatcher>(flag);
    }

    fn stop(&mut self) {
        self.watch.teardown(true);
        self.needs_rearm.store(false, Ordering::Release);
    }

    fn watch(&mut self, request: WatchRequest) -> bool {
        self.stop();
        let flag = self.flag();
        self.watch.replace::<RecommendedWatcher>(request, flag)
    }

    fn poll(&mut self) -> Option<ChangeNotification> {
        self.rearm_if_needed();
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
