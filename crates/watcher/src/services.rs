//! Process-wide factory for watchers
//!
//! Code that needs a [`FileWatcher`] asks [`instance()`] for one instead of
//! constructing it, so tests can substitute a fake backend for a scope via
//! [`testing::ScopedServicesOverride`].

use crate::FileWatcher;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait SystemServices: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    fn create_file_watcher(&self) -> FileWatcher;
}

/// Platform default: the native backend for this target
#[derive(Debug, Default)]
pub struct NativeServices;

impl SystemServices for NativeServices {
    fn name(&self) -> &str {
        "native"
    }

    fn create_file_watcher(&self) -> FileWatcher {
        FileWatcher::new()
    }
}

/// Active overrides, innermost last
static OVERRIDES: Mutex<Vec<Arc<dyn SystemServices>>> = parking_lot::const_mutex(Vec::new());

/// Innermost active override, or [`NativeServices`]
pub fn instance() -> Arc<dyn SystemServices> {
    match OVERRIDES.lock().last() {
        Some(services) => Arc::clone(services),
        None => Arc::new(NativeServices),
    }
}

fn same(a: &Arc<dyn SystemServices>, b: &Arc<dyn SystemServices>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

pub mod testing {
    use super::*;
    use tracing::debug;

    /// Replaces [`instance()`](super::instance) for its lifetime
    ///
    /// Overrides nest. Dropping one removes exactly that override, even if
    /// newer ones are still alive.
    #[must_use = "the override is removed when dropped"]
    pub struct ScopedServicesOverride {
        services: Arc<dyn SystemServices>,
    }

    impl ScopedServicesOverride {
        pub fn new(services: Arc<dyn SystemServices>) -> Self {
            debug!(services = services.name(), "services override installed");
            OVERRIDES.lock().push(Arc::clone(&services));
            Self { services }
        }
    }

    impl Drop for ScopedServicesOverride {
        fn drop(&mut self) {
            let mut overrides = OVERRIDES.lock();
            if let Some(index) = overrides.iter().rposition(|s| same(s, &self.services)) {
                overrides.remove(index);
            }
        }
    }
}
