//! Screen and lifecycle types.

use std::fmt;
use std::sync::Weak;

/// A UI surface owned by the host application.
///
/// The tracker never owns screens; it only keeps a [`ScreenRef`] to the most
/// recent one.
pub trait Screen: Send + Sync + 'static {
    /// Human-readable name, used for diagnostics only.
    fn name(&self) -> &str;
}

/// Non-owning reference to a [`Screen`].
pub type ScreenRef = Weak<dyn Screen>;

/// Lifecycle transitions reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Screen was created.
    Created,
    /// Screen became visible.
    Started,
    /// Screen gained focus.
    Resumed,
    /// Screen lost focus.
    Paused,
    /// Screen is no longer visible.
    Stopped,
    /// Screen is saving its instance state.
    SaveInstanceState,
    /// Screen was torn down.
    Destroyed,
}

impl LifecycleEvent {
    /// All transitions, in the order a host usually emits them.
    pub const ALL: [LifecycleEvent; 7] = [
        LifecycleEvent::Created,
        LifecycleEvent::Started,
        LifecycleEvent::Resumed,
        LifecycleEvent::Paused,
        LifecycleEvent::Stopped,
        LifecycleEvent::SaveInstanceState,
        LifecycleEvent::Destroyed,
    ];

    /// Returns the event name in snake case.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Created => "created",
            LifecycleEvent::Started => "started",
            LifecycleEvent::Resumed => "resumed",
            LifecycleEvent::Paused => "paused",
            LifecycleEvent::Stopped => "stopped",
            LifecycleEvent::SaveInstanceState => "save_instance_state",
            LifecycleEvent::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
