//! Periodic polling of individual files
//!
//! Runs a set of [`PollingDetector`]s on a fixed interval and forwards the
//! paths that changed. Used where native watching is unavailable or where a
//! caller only cares about a handful of files.

use crate::poller::PollingDetector;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use vigil_core::EventMask;

pub struct PeriodicPoller {
    interval: Duration,
    detectors: Vec<PollingDetector>,
    change_tx: mpsc::Sender<Vec<PathBuf>>,
}

impl PeriodicPoller {
    pub fn new(interval: Duration, change_tx: mpsc::Sender<Vec<PathBuf>>) -> Self {
        Self {
            interval,
            detectors: Vec::new(),
            change_tx,
        }
    }

    /// Start tracking `path`; the baseline is taken immediately
    pub fn track(&mut self, path: impl Into<PathBuf>, events: EventMask) {
        let mut detector = PollingDetector::new(path, events);
        detector.detect_changes();
        debug!(path = %detector.path().display(), ?events, "tracking");
        self.detectors.push(detector);
    }

    pub fn tracked(&self) -> usize {
        self.detectors.len()
    }

    /// One detection cycle across every tracked path
    pub fn scan(&mut self) -> Vec<PathBuf> {
        self.detectors
            .iter_mut()
            .filter_map(|detector| {
                detector
                    .detect_changes()
                    .then(|| detector.path().to_path_buf())
            })
            .collect()
    }

    /// Scan on every tick until the receiving side is dropped
    pub async fn run(mut self) {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.interval, paths = self.detectors.len(), "periodic polling started");

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = self.change_tx.closed() => break,
            }

            let changed = self.scan();
            if changed.is_empty() {
                continue;
            }

            debug!(count = changed.len(), "periodic poll found changes");
            if self.change_tx.send(changed).await.is_err() {
                break;
            }
        }

        info!("periodic polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_reports_only_changed_paths() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let (tx, _rx) = mpsc::channel(1);
        let mut poller = PeriodicPoller::new(Duration::from_secs(60), tx);
        poller.track(&a, EventMask::SIZE);
        poller.track(&b, EventMask::SIZE);
        assert_eq!(poller.tracked(), 2);

        assert!(poller.scan().is_empty());

        fs::write(&b, b"bigger").unwrap();
        assert_eq!(poller.scan(), vec![b.clone()]);
        assert!(poller.scan().is_empty());

        fs::remove_file(&a).unwrap();
        assert_eq!(poller.scan(), vec![a]);
    }

    #[tokio::test]
    async fn test_run_sends_changes() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("watched.txt");

        let (tx, mut rx) = mpsc::channel(10);
        let mut poller = PeriodicPoller::new(Duration::from_millis(20), tx);
        poller.track(&file, EventMask::SIZE | EventMask::LAST_WRITE);
        let handle = tokio::spawn(poller.run());

        fs::write(&file, b"appeared").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed, vec![file]);

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        let poller = PeriodicPoller::new(Duration::from_millis(10), tx);
        let handle = tokio::spawn(poller.run());

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
