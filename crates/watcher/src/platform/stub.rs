//! Backend for platforms without native change notification
//!
//! Every watch fails and nothing is ever reported. Callers fall back to
//! [`PollingDetector`](crate::poller::PollingDetector).

use super::{BackendKind, WatchState, WatcherBackend};
use tracing::debug;
use vigil_core::{ChangeNotification, EventMask, WatchRequest};

#[derive(Debug, Default)]
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WatcherBackend for StubBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Stub
    }

    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn watch(&mut self, request: WatchRequest) -> bool {
        debug!(path = %request.path.display(), "native watching unavailable");
        false
    }

    fn poll(&mut self) -> Option<ChangeNotification> {
        None
    }

    fn state(&self) -> WatchState {
        WatchState::Idle
    }

    fn pending(&self) -> usize {
        0
    }

    fn supported_events(&self) -> EventMask {
        EventMask::empty()
    }
}
