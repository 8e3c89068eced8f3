//! Identity provider trait.

use graph_auth_foreground::ScreenRef;
use tracing::debug;

use crate::callback::{AccountsCallback, TokenCallback};
use crate::types::{Account, Scopes};

/// Result of an interactive sign-in delivered back through the host
/// (for example an activity result or a redirect URI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveRedirect {
    /// Request code the sign-in UI was launched with.
    pub request_code: i32,
    /// Result code reported by the host.
    pub result_code: i32,
    /// Redirect payload, typically the redirect URI with its query string.
    pub data: Option<String>,
}

/// Asynchronous identity provider.
///
/// Every method returns immediately and reports its outcome through the
/// callback, possibly from another thread. Implementations must invoke each
/// token callback exactly once with a terminal [`TokenResponse`].
///
/// [`TokenResponse`]: crate::TokenResponse
pub trait IdentityProvider: Send + Sync {
    /// Lists the accounts currently known to the provider, in provider order.
    fn list_accounts(&self, callback: AccountsCallback);

    /// Acquires a token without user interaction.
    ///
    /// May complete with [`ProviderError::InteractionRequired`](crate::ProviderError::InteractionRequired).
    fn acquire_token_silent(
        &self,
        scopes: &Scopes,
        account: &Account,
        authority: &str,
        callback: TokenCallback,
    );

    /// Acquires a token through sign-in UI anchored to `anchor`.
    ///
    /// `anchor` is `None` when no foreground screen was ever recorded, and
    /// may point to a screen that no longer exists. What happens then is up
    /// to the provider.
    fn acquire_token_interactive(
        &self,
        anchor: Option<ScreenRef>,
        scopes: &Scopes,
        callback: TokenCallback,
    );

    /// Forwards the result of an interactive sign-in to the provider.
    fn handle_interactive_redirect(&self, redirect: InteractiveRedirect) {
        debug!(
            provider = self.name(),
            request_code = redirect.request_code,
            "Interactive redirect ignored by provider"
        );
    }

    /// Returns the name of this provider for logging/debugging.
    fn name(&self) -> &'static str;
}
