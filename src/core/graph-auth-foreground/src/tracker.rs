//! Foreground screen tracker.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::host::{LifecycleHost, LifecycleObserver, ObserverId};
use crate::screen::{LifecycleEvent, Screen, ScreenRef};

/// Remembers the screen seen by the most recent lifecycle transition.
///
/// Every transition overwrites the record the same way, including
/// [`LifecycleEvent::Paused`], [`LifecycleEvent::Stopped`] and
/// [`LifecycleEvent::Destroyed`]. The record is not checked for staleness: a
/// screen that has been torn down is still returned by [`current`], and
/// whoever launches interactive sign-in against it deals with the result.
///
/// [`current`]: ForegroundTracker::current
#[derive(Default)]
pub struct ForegroundTracker {
    current: RwLock<Option<ScreenRef>>,
}

impl ForegroundTracker {
    /// Creates a tracker seeded with the screen active at construction time.
    pub fn new(initial: &Arc<dyn Screen>) -> Self {
        Self {
            current: RwLock::new(Some(Arc::downgrade(initial))),
        }
    }

    /// Creates a tracker that has not seen any screen yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Subscribes a new tracker to `host`.
    ///
    /// The tracker stays subscribed until the returned guard is dropped.
    pub fn register(
        host: Arc<dyn LifecycleHost>,
        initial: Option<&Arc<dyn Screen>>,
    ) -> TrackerRegistration {
        let tracker = Arc::new(match initial {
            Some(screen) => Self::new(screen),
            None => Self::empty(),
        });
        let id = host.register_observer(tracker.clone());
        debug!(observer_id = id.get(), "Foreground tracker registered");

        TrackerRegistration { host, id, tracker }
    }

    /// Records `screen` as the current foreground screen.
    pub fn record(&self, screen: &Arc<dyn Screen>) {
        *self.current.write() = Some(Arc::downgrade(screen));
    }

    /// Returns the last recorded screen, if any.
    pub fn current(&self) -> Option<ScreenRef> {
        self.current.read().clone()
    }

    /// Name of the last recorded screen, if it is still alive.
    pub fn current_name(&self) -> Option<String> {
        self.current()
            .and_then(|screen| screen.upgrade())
            .map(|screen| screen.name().to_string())
    }
}

impl LifecycleObserver for ForegroundTracker {
    fn on_lifecycle(&self, event: LifecycleEvent, screen: &Arc<dyn Screen>) {
        trace!(event = %event, screen = screen.name(), "Foreground screen updated");
        self.record(screen);
    }
}

/// Scoped subscription of a [`ForegroundTracker`] to a [`LifecycleHost`].
///
/// Dropping the guard unregisters the tracker. Clones of the tracker obtained
/// through [`tracker`](TrackerRegistration::tracker) keep their last record
/// but receive no further updates.
pub struct TrackerRegistration {
    host: Arc<dyn LifecycleHost>,
    id: ObserverId,
    tracker: Arc<ForegroundTracker>,
}

impl TrackerRegistration {
    /// The registered tracker.
    pub fn tracker(&self) -> Arc<ForegroundTracker> {
        Arc::clone(&self.tracker)
    }
}

impl Drop for TrackerRegistration {
    fn drop(&mut self) {
        if self.host.unregister_observer(self.id) {
            debug!(observer_id = self.id.get(), "Foreground tracker unregistered");
        }
    }
}
