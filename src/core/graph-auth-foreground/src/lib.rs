//! # Graph Auth Foreground
//!
//! Tracks which screen the host application currently has in the foreground.
//!
//! Interactive sign-in has to be anchored to a visible UI surface. The
//! [`ForegroundTracker`] listens to every lifecycle transition of the host and
//! keeps a weak reference to the screen it last saw, so the token bridge can
//! hand that screen to the identity provider when interaction is required.
//!
//! ## Registration
//!
//! Tracking is scoped: [`ForegroundTracker::register`] returns a
//! [`TrackerRegistration`] guard and the tracker stays subscribed to the host
//! only as long as the guard is alive.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod host;
pub mod screen;
pub mod tracker;

pub use host::{LifecycleHost, LifecycleObserver, LifecycleRegistry, ObserverId};
pub use screen::{LifecycleEvent, Screen, ScreenRef};
pub use tracker::{ForegroundTracker, TrackerRegistration};
