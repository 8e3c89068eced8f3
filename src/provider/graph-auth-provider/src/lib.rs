//! # Graph Auth Provider
//!
//! Contract between the token bridge and an identity provider library.
//!
//! The provider is asynchronous and callback driven: every operation takes a
//! one-shot callback and returns immediately. Callbacks may run on any thread
//! the provider chooses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod callback;
pub mod error;
pub mod provider;
pub mod types;

pub use callback::{AccountsCallback, TokenCallback, TokenResponse};
pub use error::ProviderError;
pub use provider::{IdentityProvider, InteractiveRedirect};
pub use types::{AccessToken, Account, AuthenticationResult, Scopes};
