//! Per-path debouncing logic
//!
//! Coalesces bursts of `Modified` notifications for the same path (an editor
//! saving in several writes, a build tool touching a file repeatedly). Name
//! changes always pass and reset the path's window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use vigil_core::{ChangeKind, ChangeNotification};

/// Entries are pruned once the map grows past this many paths
const PRUNE_THRESHOLD: usize = 1024;

/// Leading-edge debouncer keyed by path
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_modified: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_modified: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    /// Decide whether `notification` observed at `now` should be delivered
    pub fn admit(&mut self, notification: &ChangeNotification, now: Instant) -> bool {
        if !self.is_enabled() {
            return true;
        }

        if notification.kind != ChangeKind::Modified {
            self.last_modified.remove(&notification.path);
            return true;
        }

        if let Some(last) = self.last_modified.get(&notification.path) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        }

        if self.last_modified.len() >= PRUNE_THRESHOLD {
            self.prune(now);
        }
        self.last_modified.insert(notification.path.clone(), now);
        true
    }

    /// Drop entries whose window has expired
    fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.last_modified
            .retain(|_, last| now.saturating_duration_since(*last) < window);
    }
}
