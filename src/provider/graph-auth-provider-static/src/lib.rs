//! # Graph Auth Static Provider
//!
//! An [`IdentityProvider`] that answers from a script instead of a real
//! identity service.
//!
//! Responses are delivered from tasks spawned on a tokio runtime, never on the
//! calling thread, so the token bridge sees the same asynchronous behaviour it
//! would get from a real provider.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use graph_auth_foreground::ScreenRef;
use graph_auth_provider::{
    Account, AccountsCallback, AuthenticationResult, IdentityProvider, InteractiveRedirect,
    ProviderError, Scopes, TokenCallback, TokenResponse,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::debug;

/// Lifetime given to scripted tokens.
const TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// What the provider answers for one acquisition stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedResponse {
    /// Succeed with this access token.
    Token(String),
    /// Fail with this error.
    Error(ProviderError),
    /// The user dismissed the prompt.
    Cancel,
    /// Drop the callback without answering.
    Abandon,
}

impl ScriptedResponse {
    /// Succeed with `token`.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }
}

/// Snapshot of how often each provider operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `list_accounts` calls.
    pub list_accounts: usize,
    /// `acquire_token_silent` calls.
    pub silent: usize,
    /// `acquire_token_interactive` calls.
    pub interactive: usize,
    /// `handle_interactive_redirect` calls.
    pub redirects: usize,
}

#[derive(Default)]
struct Counters {
    list_accounts: AtomicUsize,
    silent: AtomicUsize,
    interactive: AtomicUsize,
    redirects: AtomicUsize,
}

/// Scripted identity provider.
pub struct StaticIdentityProvider {
    runtime: Handle,
    accounts: Vec<Account>,
    silent: ScriptedResponse,
    interactive: ScriptedResponse,
    latency: Option<Duration>,
    counters: Counters,
    silent_accounts: Mutex<Vec<Account>>,
    interactive_anchors: Mutex<Vec<Option<String>>>,
}

impl StaticIdentityProvider {
    /// Starts building a provider whose callbacks run on `runtime`.
    pub fn builder(runtime: Handle) -> StaticIdentityProviderBuilder {
        StaticIdentityProviderBuilder {
            runtime,
            accounts: Vec::new(),
            silent: ScriptedResponse::Cancel,
            interactive: ScriptedResponse::Cancel,
            latency: None,
        }
    }

    /// How often each operation was invoked so far.
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            list_accounts: self.counters.list_accounts.load(Ordering::SeqCst),
            silent: self.counters.silent.load(Ordering::SeqCst),
            interactive: self.counters.interactive.load(Ordering::SeqCst),
            redirects: self.counters.redirects.load(Ordering::SeqCst),
        }
    }

    /// Accounts passed to silent acquisition, in call order.
    pub fn silent_accounts(&self) -> Vec<Account> {
        self.silent_accounts.lock().clone()
    }

    /// Names of the anchors passed to interactive acquisition, in call order.
    ///
    /// `None` means no anchor was given or the anchor was already gone.
    pub fn interactive_anchors(&self) -> Vec<Option<String>> {
        self.interactive_anchors.lock().clone()
    }

    fn respond(
        &self,
        stage: &'static str,
        response: &ScriptedResponse,
        scopes: &Scopes,
        account: Option<Account>,
        callback: TokenCallback,
    ) {
        let response = match response {
            ScriptedResponse::Token(token) => {
                let mut result = AuthenticationResult::new(token.clone())
                    .with_expires_at(expires_at())
                    .with_scopes(scopes);
                if let Some(account) = account {
                    result = result.with_account(account);
                }
                TokenResponse::Success(result)
            },
            ScriptedResponse::Error(error) => TokenResponse::Error(error.clone()),
            ScriptedResponse::Cancel => TokenResponse::Cancelled,
            ScriptedResponse::Abandon => {
                debug!(stage, "Scripted provider abandoning callback");
                drop(callback);
                return;
            },
        };

        let latency = self.latency;
        self.runtime.spawn(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            debug!(stage, "Scripted provider answering");
            callback(response);
        });
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn list_accounts(&self, callback: AccountsCallback) {
        self.counters.list_accounts.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts.clone();
        let latency = self.latency;
        self.runtime.spawn(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            callback(Ok(accounts));
        });
    }

    fn acquire_token_silent(
        &self,
        scopes: &Scopes,
        account: &Account,
        authority: &str,
        callback: TokenCallback,
    ) {
        self.counters.silent.fetch_add(1, Ordering::SeqCst);
        self.silent_accounts.lock().push(account.clone());
        debug!(account_id = %account.id, authority, "Scripted silent acquisition");
        self.respond("silent", &self.silent, scopes, Some(account.clone()), callback);
    }

    fn acquire_token_interactive(
        &self,
        anchor: Option<ScreenRef>,
        scopes: &Scopes,
        callback: TokenCallback,
    ) {
        self.counters.interactive.fetch_add(1, Ordering::SeqCst);
        let anchor_name = anchor
            .and_then(|screen| screen.upgrade())
            .map(|screen| screen.name().to_string());
        self.interactive_anchors.lock().push(anchor_name);
        self.respond("interactive", &self.interactive, scopes, None, callback);
    }

    fn handle_interactive_redirect(&self, redirect: InteractiveRedirect) {
        self.counters.redirects.fetch_add(1, Ordering::SeqCst);
        debug!(
            request_code = redirect.request_code,
            result_code = redirect.result_code,
            "Scripted provider received redirect"
        );
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Builder for [`StaticIdentityProvider`].
pub struct StaticIdentityProviderBuilder {
    runtime: Handle,
    accounts: Vec<Account>,
    silent: ScriptedResponse,
    interactive: ScriptedResponse,
    latency: Option<Duration>,
}

impl StaticIdentityProviderBuilder {
    /// Adds a known account. Accounts are reported in insertion order.
    pub fn account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    /// Answer for silent acquisition (default: cancel).
    pub fn silent(mut self, response: ScriptedResponse) -> Self {
        self.silent = response;
        self
    }

    /// Answer for interactive acquisition (default: cancel).
    pub fn interactive(mut self, response: ScriptedResponse) -> Self {
        self.interactive = response;
        self
    }

    /// Delay applied before every answer.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Builds the provider.
    pub fn build(self) -> StaticIdentityProvider {
        StaticIdentityProvider {
            runtime: self.runtime,
            accounts: self.accounts,
            silent: self.silent,
            interactive: self.interactive,
            latency: self.latency,
            counters: Counters::default(),
            silent_accounts: Mutex::new(Vec::new()),
            interactive_anchors: Mutex::new(Vec::new()),
        }
    }
}

fn expires_at() -> u64 {
    SystemTime::now()
        .checked_add(TOKEN_LIFETIME)
        .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
