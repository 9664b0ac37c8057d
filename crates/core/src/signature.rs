//! Comparable snapshot of a single file's state
//!
//! Used by the polling detector to decide whether a file changed between two
//! observations without any native notification support.

use std::time::SystemTime;

/// Result of probing a path once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The path does not exist
    Missing,
    /// The path exists. Each attribute is `None` when it is not tracked or
    /// when probing it failed.
    Present {
        size: Option<u64>,
        last_write: Option<SystemTime>,
    },
    /// Existence could not be determined (permission denied, I/O error)
    Unknown,
}

/// Cached state of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSignature {
    pub exists: bool,
    pub size: Option<u64>,
    pub last_write: Option<SystemTime>,
    pub initial_sample_taken: bool,
}

impl ChangeSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an observation into the signature
    ///
    /// Returns true when the observation differs from the cached state. The
    /// first usable observation only establishes the baseline. Cached
    /// attributes track the latest observation, so drift is measured call to
    /// call rather than against the baseline.
    pub fn record(&mut self, observation: Observation) -> bool {
        let baseline = !self.initial_sample_taken;

        match observation {
            // No information: leave everything as it was, including the
            // baseline flag.
            Observation::Unknown => false,

            Observation::Missing => {
                let changed = !baseline && self.exists;
                self.exists = false;
                self.size = None;
                self.last_write = None;
                self.initial_sample_taken = true;
                changed
            }

            Observation::Present { size, last_write } => {
                let mut changed = false;

                if let Some(size) = size {
                    if self.size.is_some_and(|prev| prev != size) {
                        changed = true;
                    }
                    self.size = Some(size);
                }

                if let Some(last_write) = last_write {
                    if self.last_write.is_some_and(|prev| prev != last_write) {
                        changed = true;
                    }
                    self.last_write = Some(last_write);
                }

                // Reappearance is a change even when no attribute is tracked
                if !self.exists {
                    changed = true;
                }

                self.exists = true;
                self.initial_sample_taken = true;
                changed && !baseline
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn present(size: u64, secs: u64) -> Observation {
        Observation::Present {
            size: Some(size),
            last_write: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
        }
    }

    #[test]
    fn test_first_observation_is_baseline() {
        let mut sig = ChangeSignature::new();
        assert!(!sig.record(present(4, 100)));
        assert!(sig.initial_sample_taken);

        let mut missing = ChangeSignature::new();
        assert!(!missing.record(Observation::Missing));
        assert!(missing.initial_sample_taken);
    }

    #[test]
    fn test_unknown_does_not_take_baseline() {
        let mut sig = ChangeSignature::new();
        assert!(!sig.record(Observation::Unknown));
        assert!(!sig.initial_sample_taken);

        // Still treated as the baseline
        assert!(!sig.record(present(4, 100)));
    }

    #[test]
    fn test_attribute_drift_is_incremental() {
        let mut sig = ChangeSignature::new();
        sig.record(present(4, 100));

        assert!(sig.record(present(10, 200)));
        assert!(!sig.record(present(10, 200)));
        assert_eq!(sig.size, Some(10));
    }

    #[test]
    fn test_disappearance_reported_once() {
        let mut sig = ChangeSignature::new();
        sig.record(present(4, 100));

        assert!(sig.record(Observation::Missing));
        assert!(!sig.record(Observation::Missing));
        assert_eq!(sig.size, None);
        assert_eq!(sig.last_write, None);
    }

    #[test]
    fn test_reappearance_without_tracking() {
        let untracked = Observation::Present {
            size: None,
            last_write: None,
        };

        let mut sig = ChangeSignature::new();
        assert!(!sig.record(untracked));
        assert!(!sig.record(untracked));
        assert!(sig.record(Observation::Missing));
        assert!(sig.record(untracked));
    }

    #[test]
    fn test_missing_baseline_then_created() {
        let mut sig = ChangeSignature::new();
        assert!(!sig.record(Observation::Missing));
        assert!(sig.record(present(1, 1)));
    }

    #[test]
    fn test_failed_attribute_read_keeps_cache() {
        let mut sig = ChangeSignature::new();
        sig.record(present(4, 100));

        let partial = Observation::Present {
            size: None,
            last_write: None,
        };
        assert!(!sig.record(partial));
        assert_eq!(sig.size, Some(4));

        // Compared against the retained value
        assert!(sig.record(present(5, 100)));
    }
}
