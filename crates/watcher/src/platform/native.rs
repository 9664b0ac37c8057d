//! Watch lifecycle shared by the native backends
//!
//! Validation, handle acquisition, teardown and the queue live here; the
//! backends decide which native watcher type to use, whether a directory is
//! required, and whether to rearm.

use super::listener::{Listener, ListenerConfig};
use super::WatchState;
use crate::error::WatchError;
use crate::queue::NotificationQueue;
use crate::translate::Scope;
use notify::Watcher;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info};
use vigil_core::{ChangeNotification, EventMask, WatchRequest};

pub(crate) struct NativeWatch {
    queue: NotificationQueue,
    state: WatchState,
    /// Logical target, retained across `stop()` so `start()` can resume it
    request: Option<WatchRequest>,
    /// Canonical root of the live listener
    root: Option<PathBuf>,
    listener: Option<Listener>,
    supported: EventMask,
    require_directory: bool,
}

impl NativeWatch {
    pub(crate) fn new(supported: EventMask, require_directory: bool) -> Self {
        Self {
            queue: NotificationQueue::new(),
            state: WatchState::Idle,
            request: None,
            root: None,
            listener: None,
            supported,
            require_directory,
        }
    }

    pub(crate) fn state(&self) -> WatchState {
        self.state
    }

    pub(crate) fn queue(&self) -> &NotificationQueue {
        &self.queue
    }

    pub(crate) fn supported(&self) -> EventMask {
        self.supported
    }

    pub(crate) fn request(&self) -> Option<&WatchRequest> {
        self.request.as_ref()
    }

    pub(crate) fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub(crate) fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Check the request against the filesystem and resolve its root
    pub(crate) fn validate(&self, request: &WatchRequest) -> Result<PathBuf, WatchError> {
        if request.path.as_os_str().is_empty() {
            return Err(WatchError::EmptyPath);
        }

        let metadata =
            fs::metadata(&request.path).map_err(|_| WatchError::Missing(request.path.clone()))?;

        if (self.require_directory || request.recursive()) && !metadata.is_dir() {
            return Err(WatchError::NotADirectory(request.path.clone()));
        }

        Ok(resolve_root(&request.path))
    }

    /// Idle -> Starting -> Running, or back to Idle on failure
    ///
    /// Does not touch the queue.
    pub(crate) fn establish<W>(
        &mut self,
        request: &WatchRequest,
        rearm: Option<Arc<AtomicBool>>,
    ) -> Result<PathBuf, WatchError>
    where
        W: Watcher + Send + 'static,
    {
        self.state = WatchState::Starting;

        let spawned = self.validate(request).and_then(|root| {
            let config = ListenerConfig {
                scope: Scope::new(root.clone(), request.recursive()),
                events: request.events & self.supported,
                debounce: request.options.debounce,
                rearm,
            };
            Listener::spawn::<W>(config, self.queue.clone()).map(|listener| (root, listener))
        });

        match spawned {
            Ok((root, listener)) => {
                self.listener = Some(listener);
                self.state = WatchState::Running;
                self.root = Some(root.clone());
                Ok(root)
            }
            Err(e) => {
                self.state = WatchState::Idle;
                Err(e)
            }
        }
    }

    /// Running -> Stopping -> Idle
    ///
    /// Joins the listener and releases the native handle. The queue is
    /// cleared only when `clear_queue` is set; a rearm keeps it.
    pub(crate) fn teardown(&mut self, clear_queue: bool) {
        if let Some(mut listener) = self.listener.take() {
            self.state = WatchState::Stopping;
            listener.shutdown();
        }

        self.root = None;
        if clear_queue {
            self.queue.clear();
        }
        self.state = WatchState::Idle;
    }

    /// Full `watch()` semantics: tear down, drain, establish
    pub(crate) fn replace<W>(&mut self, request: WatchRequest, rearm: Option<Arc<AtomicBool>>) -> bool
    where
        W: Watcher + Send + 'static,
    {
        self.teardown(true);
        self.request = None;

        let dropped = request.events - self.supported;
        if !dropped.is_empty() {
            debug!(?dropped, "ignoring event bits this backend cannot observe");
        }

        match self.establish::<W>(&request, rearm) {
            Ok(root) => {
                info!(root = %root.display(), recursive = request.recursive(), "watch established");
                self.request = Some(request);
                true
            }
            Err(e) => {
                debug!(path = %request.path.display(), error = %e, "watch not established");
                false
            }
        }
    }

    /// Re-establish the retained request after a `stop()`
    pub(crate) fn resume<W>(&mut self, rearm: Option<Arc<AtomicBool>>) -> bool
    where
        W: Watcher + Send + 'static,
    {
        if self.listener.is_some() {
            return true;
        }

        let Some(request) = self.request.clone() else {
            return false;
        };

        match self.establish::<W>(&request, rearm) {
            Ok(root) => {
                info!(root = %root.display(), "watch resumed");
                true
            }
            Err(e) => {
                debug!(path = %request.path.display(), error = %e, "watch not resumed");
                false
            }
        }
    }

    /// Re-open the native handle against the same logical target
    ///
    /// Queues an `Added` for the root on success, since the native handle
    /// could not have seen the target reappear.
    pub(crate) fn rearm<W>(&mut self, flag: Option<Arc<AtomicBool>>) -> Result<(), WatchError>
    where
        W: Watcher + Send + 'static,
    {
        let Some(request) = self.request.clone() else {
            return Ok(());
        };

        // Keep the stale listener until the target is back
        self.validate(&request)?;

        self.teardown(false);
        let root = self.establish::<W>(&request, flag)?;
        info!(root = %root.display(), "watch rearmed");
        self.queue.push(ChangeNotification::new(vigil_core::ChangeKind::Added, root));
        Ok(())
    }

    pub(crate) fn poll(&self) -> Option<ChangeNotification> {
        self.queue.poll()
    }
}

impl Drop for NativeWatch {
    fn drop(&mut self) {
        self.teardown(true);
    }
}

/// Canonical path when resolvable, otherwise absolute, otherwise as given
pub(crate) fn resolve_root(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }

    if path.is_absolute() {
        return path.to_path_buf();
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
