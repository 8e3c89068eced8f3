//! One-shot callbacks handed to the provider.
//!
//! Callbacks are `FnOnce`: a provider can invoke each of them at most once.

use crate::error::ProviderError;
use crate::types::{Account, AuthenticationResult};

/// Terminal result of a token acquisition attempt.
#[derive(Debug)]
pub enum TokenResponse {
    /// A token was acquired.
    Success(AuthenticationResult),
    /// The attempt failed.
    Error(ProviderError),
    /// The user dismissed the attempt.
    Cancelled,
}

/// Receives the result of [`IdentityProvider::list_accounts`](crate::IdentityProvider::list_accounts).
pub type AccountsCallback = Box<dyn FnOnce(Result<Vec<Account>, ProviderError>) + Send>;

/// Receives the terminal result of a token acquisition attempt.
pub type TokenCallback = Box<dyn FnOnce(TokenResponse) + Send>;
