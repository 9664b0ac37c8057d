//! FIFO handoff between listener threads and the polling consumer

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use vigil_core::ChangeNotification;

/// Unbounded, thread-safe notification queue
///
/// Cloning yields another handle to the same storage: the listener thread
/// holds one to push, the backend holds one to poll. Nothing is ever dropped
/// except by [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    inner: Arc<Mutex<VecDeque<ChangeNotification>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: ChangeNotification) {
        self.inner.lock().push_back(notification);
    }

    /// Push a batch under a single lock so it stays contiguous
    pub fn extend(&self, notifications: impl IntoIterator<Item = ChangeNotification>) {
        self.inner.lock().extend(notifications);
    }

    /// Remove and return the oldest notification, never blocks on emptiness
    pub fn poll(&self) -> Option<ChangeNotification> {
        self.inner.lock().pop_front()
    }

    /// Discard everything pending
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
