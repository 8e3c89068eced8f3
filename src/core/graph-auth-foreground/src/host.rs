//! Host lifecycle registration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::screen::{LifecycleEvent, Screen};

/// Receives lifecycle transitions from a [`LifecycleHost`].
pub trait LifecycleObserver: Send + Sync {
    /// Called for every transition of every screen of the host.
    fn on_lifecycle(&self, event: LifecycleEvent, screen: &Arc<dyn Screen>);
}

/// Identifier handed out by [`LifecycleHost::register_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Creates an identifier from a raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Application-wide source of lifecycle transitions.
///
/// Implemented by the embedding host. [`LifecycleRegistry`] is a ready-made
/// in-process implementation.
pub trait LifecycleHost: Send + Sync {
    /// Subscribes an observer to every future transition.
    fn register_observer(&self, observer: Arc<dyn LifecycleObserver>) -> ObserverId;

    /// Removes a previously registered observer.
    ///
    /// Returns `false` if the id was unknown (already removed).
    fn unregister_observer(&self, id: ObserverId) -> bool;
}

/// In-process lifecycle host.
///
/// Hosts that do not have their own lifecycle plumbing forward transitions
/// to [`LifecycleRegistry::dispatch`].
#[derive(Default)]
pub struct LifecycleRegistry {
    next_id: AtomicU64,
    observers: RwLock<Vec<(ObserverId, Arc<dyn LifecycleObserver>)>>,
}

impl LifecycleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a transition to every registered observer.
    pub fn dispatch(&self, event: LifecycleEvent, screen: &Arc<dyn Screen>) {
        // Snapshot so observers may (un)register from inside the callback.
        let observers: Vec<Arc<dyn LifecycleObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer.on_lifecycle(event, screen);
        }
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl LifecycleHost for LifecycleRegistry {
    fn register_observer(&self, observer: Arc<dyn LifecycleObserver>) -> ObserverId {
        let id = ObserverId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, observer));
        debug!(observer_id = id.get(), "Lifecycle observer registered");
        id
    }

    fn unregister_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        let removed = observers.len() != before;
        if removed {
            debug!(observer_id = id.get(), "Lifecycle observer unregistered");
        }
        removed
    }
}
