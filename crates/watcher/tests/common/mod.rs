//! Common utilities for watcher integration tests

use std::thread;
use std::time::{Duration, Instant};
use vigil_core::ChangeNotification;
use vigil_watcher::FileWatcher;

pub const DEADLINE: Duration = Duration::from_secs(5);

/// Drain until `pred` matches, collecting everything seen on the way
pub fn collect_until(
    watcher: &mut FileWatcher,
    pred: impl Fn(&ChangeNotification) -> bool,
) -> (Vec<ChangeNotification>, bool) {
    let start = Instant::now();
    let mut seen = Vec::new();

    while start.elapsed() < DEADLINE {
        while let Some(notification) = watcher.poll() {
            let done = pred(&notification);
            seen.push(notification);
            if done {
                return (seen, true);
            }
        }
        thread::sleep(Duration::from_millis(20));
    }

    (seen, false)
}

/// Wait until at least one notification is pending
#[allow(dead_code)]
pub fn wait_pending(watcher: &FileWatcher) -> bool {
    let start = Instant::now();
    while start.elapsed() < DEADLINE {
        if watcher.pending() > 0 {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}
