//! # Graph Auth
//!
//! Synchronous bearer-token authentication for outbound requests, built on top
//! of an asynchronous, callback-driven [`IdentityProvider`].
//!
//! ## Flow
//!
//! [`TokenBridge::authenticate`] lists the provider's accounts, tries silent
//! acquisition for the first one and falls back to interactive sign-in
//! (anchored to the current foreground screen) when the provider asks for
//! interaction or no account exists. The calling thread blocks until the
//! provider reports a terminal result.
//!
//! [`TokenBridge::decorate`] and [`TokenBridge::authenticate_request`] attach
//! the token as `Authorization: Bearer <token>`.
//!
//! ## Errors
//!
//! Every provider failure is normalized into [`AuthError`]; the original
//! provider error stays reachable through [`std::error::Error::source`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod classify;
pub mod config;
pub mod error;
pub mod flow;
pub mod outcome;
pub mod request;

#[cfg(test)]
mod testing;

pub use bridge::{TokenBridge, TokenBridgeBuilder};
pub use classify::classify;
pub use config::{BridgeConfig, AUTHORIZATION_HEADER, BEARER_PREFIX, DEFAULT_AUTHORITY};
pub use error::{AcquisitionStage, AuthError, AuthErrorKind};
pub use request::{bearer_header_value, AuthenticationProvider, AuthorizableRequest};

pub use graph_auth_foreground::{ForegroundTracker, LifecycleHost, Screen, TrackerRegistration};
pub use graph_auth_provider::{
    AccessToken, Account, AuthenticationResult, IdentityProvider, InteractiveRedirect,
    ProviderError, Scopes,
};
