//! Poll-based change detection for a single file
//!
//! No background thread, no native handle. Each call to
//! [`PollingDetector::detect_changes`] stats the file once and compares the
//! result to the previous call.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;
use vigil_core::{ChangeSignature, EventMask, Observation};

/// Detects changes to one path across discrete calls
#[derive(Debug, Clone)]
pub struct PollingDetector {
    path: PathBuf,
    track_size: bool,
    track_last_write: bool,
    signature: ChangeSignature,
}

impl PollingDetector {
    /// Create a detector for `path`
    ///
    /// Size is tracked when `events` contains [`EventMask::SIZE`], the
    /// modification time when it contains [`EventMask::LAST_WRITE`].
    /// Existence is always tracked.
    pub fn new(path: impl Into<PathBuf>, events: EventMask) -> Self {
        Self {
            path: path.into(),
            track_size: events.contains(EventMask::SIZE),
            track_last_write: events.contains(EventMask::LAST_WRITE),
            signature: ChangeSignature::new(),
        }
    }

    /// Whether the file changed since the previous call
    ///
    /// The first call only records a baseline and returns false.
    pub fn detect_changes(&mut self) -> bool {
        let observation = self.observe();
        let changed = self.signature.record(observation);
        if changed {
            trace!(path = %self.path.display(), ?observation, "change detected");
        }
        changed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn signature(&self) -> &ChangeSignature {
        &self.signature
    }

    /// Stat the file once
    fn observe(&self) -> Observation {
        let observation = classify_stat(
            fs::metadata(&self.path),
            self.track_size,
            self.track_last_write,
        );
        if observation == Observation::Unknown {
            trace!(path = %self.path.display(), "stat failed");
        }
        observation
    }
}

/// Turn one metadata lookup into an observation
///
/// Not-found means missing; any other failure carries no information.
fn classify_stat(
    stat: io::Result<fs::Metadata>,
    track_size: bool,
    track_last_write: bool,
) -> Observation {
    match stat {
        Ok(metadata) => Observation::Present {
            size: track_size.then(|| metadata.len()),
            last_write: if track_last_write {
                metadata.modified().ok()
            } else {
                None
            },
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Observation::Missing,
        Err(_) => Observation::Unknown,
    }
}
