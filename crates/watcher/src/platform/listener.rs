//! Background listener thread shared by the native backends
//!
//! The native watcher delivers raw events into a channel; a dedicated thread
//! blocks on that channel and a stop channel, translates what it receives and
//! pushes the result into the notification queue.

use crate::debounce::Debouncer;
use crate::error::WatchError;
use crate::queue::NotificationQueue;
use crate::translate::{invalidates_root, translate, RenameTracker, Scope};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use notify::{Event, RecursiveMode, Watcher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use vigil_core::EventMask;

/// What a listener reports and where
#[derive(Debug, Clone)]
pub(crate) struct ListenerConfig {
    pub scope: Scope,
    pub events: EventMask,
    pub debounce: Duration,
    /// Raised when the root handle goes stale. `None` for backends without
    /// a rearm policy.
    pub rearm: Option<Arc<AtomicBool>>,
}

/// An owned native handle plus the thread draining it
///
/// Dropping the listener stops it: the thread is always joined before the
/// native handle is released.
pub(crate) struct Listener {
    watcher: Option<Box<dyn Watcher + Send>>,
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Listener {
    /// Acquire a native handle of type `W` on the scope root and start
    /// draining it
    pub(crate) fn spawn<W>(config: ListenerConfig, queue: NotificationQueue) -> Result<Self, WatchError>
    where
        W: Watcher + Send + 'static,
    {
        let (event_tx, event_rx) = unbounded();
        let mut watcher = W::new(
            move |result: notify::Result<Event>| {
                // Receiver gone means we are shutting down
                let _ = event_tx.send(result);
            },
            notify::Config::default(),
        )?;

        let mode = if config.scope.is_recursive() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(config.scope.root(), mode)?;

        let (stop_tx, stop_rx) = bounded(1);
        let thread = thread::Builder::new()
            .name("vigil-listener".to_string())
            .spawn(move || run(config, queue, event_rx, stop_rx))
            .map_err(WatchError::Spawn)?;

        Ok(Self {
            watcher: Some(Box::new(watcher)),
            stop_tx,
            thread: Some(thread),
        })
    }

    /// Signal the thread, wait for it to exit, then release the handle
    pub(crate) fn shutdown(&mut self) {
        let _ = self.stop_tx.try_send(());

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("listener thread panicked");
            }
        }

        self.watcher.take();
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    config: ListenerConfig,
    queue: NotificationQueue,
    events: Receiver<notify::Result<Event>>,
    stop: Receiver<()>,
) {
    let mut debouncer = Debouncer::new(config.debounce);
    let mut renames = RenameTracker::new();
    debug!(root = %config.scope.root().display(), "listener started");

    loop {
        select! {
            recv(stop) -> _ => break,
            recv(events) -> message => match message {
                Ok(Ok(event)) => handle_event(&config, &queue, &mut debouncer, &mut renames, &event),
                Ok(Err(error)) => handle_error(&config, &error),
                // Native watcher dropped underneath us
                Err(_) => break,
            },
        }
    }

    debug!(root = %config.scope.root().display(), "listener stopped");
}

fn handle_event(
    config: &ListenerConfig,
    queue: &NotificationQueue,
    debouncer: &mut Debouncer,
    renames: &mut RenameTracker,
    event: &Event,
) {
    if event.need_rescan() {
        warn!(
            root = %config.scope.root().display(),
            "native event queue overflowed, some changes were missed"
        );
    }

    if let Some(rearm) = &config.rearm {
        if invalidates_root(event, &config.scope) {
            debug!(root = %config.scope.root().display(), kind = ?event.kind, "watch root invalidated");
            rearm.store(true, Ordering::Release);
        }
    }

    if renames.is_duplicate(event) {
        trace!(tracker = ?event.tracker(), "rename already reported");
        return;
    }

    let now = Instant::now();
    let batch: Vec<_> = translate(event, config.events, &config.scope)
        .into_iter()
        .filter(|notification| debouncer.admit(notification, now))
        .collect();

    if !batch.is_empty() {
        trace!(count = batch.len(), kind = ?event.kind, "queueing notifications");
        queue.extend(batch);
    }
}

fn handle_error(config: &ListenerConfig, error: &notify::Error) {
    warn!(root = %config.scope.root().display(), %error, "native watcher error");

    let Some(rearm) = &config.rearm else {
        return;
    };

    let lost_watch = matches!(error.kind, notify::ErrorKind::WatchNotFound)
        || error.paths.iter().any(|path| path == config.scope.root());
    if lost_watch {
        rearm.store(true, Ordering::Release);
    }
}
