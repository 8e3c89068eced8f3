//! In-crate provider double for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use graph_auth_foreground::ScreenRef;
use graph_auth_provider::{
    Account, AccountsCallback, AuthenticationResult, IdentityProvider, InteractiveRedirect,
    ProviderError, Scopes, TokenCallback, TokenResponse,
};
use parking_lot::Mutex;

use crate::config::BridgeConfig;

/// How the double delivers its answers.
#[derive(Clone, Copy)]
pub(crate) enum Delivery {
    /// Call back on the calling thread, before returning.
    Inline,
    /// Call back from a freshly spawned thread.
    Thread,
}

#[derive(Clone)]
pub(crate) enum Reply {
    Token(&'static str),
    Error(ProviderError),
    Cancel,
    Drop,
}

pub(crate) struct MockProvider {
    accounts: Result<Vec<Account>, ProviderError>,
    silent: Reply,
    interactive: Reply,
    delivery: Delivery,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) silent_calls: AtomicUsize,
    pub(crate) interactive_calls: AtomicUsize,
    pub(crate) silent_accounts: Mutex<Vec<String>>,
    pub(crate) authorities: Mutex<Vec<String>>,
    pub(crate) anchors: Mutex<Vec<Option<String>>>,
    pub(crate) redirects: Mutex<Vec<InteractiveRedirect>>,
}

impl MockProvider {
    pub(crate) fn new(account_ids: &[&str], silent: Reply, interactive: Reply) -> Self {
        Self::with_accounts(
            Ok(account_ids.iter().map(|id| Account::new(*id)).collect()),
            silent,
            interactive,
        )
    }

    pub(crate) fn with_accounts(
        accounts: Result<Vec<Account>, ProviderError>,
        silent: Reply,
        interactive: Reply,
    ) -> Self {
        Self {
            accounts,
            silent,
            interactive,
            delivery: Delivery::Thread,
            list_calls: AtomicUsize::new(0),
            silent_calls: AtomicUsize::new(0),
            interactive_calls: AtomicUsize::new(0),
            silent_accounts: Mutex::new(Vec::new()),
            authorities: Mutex::new(Vec::new()),
            anchors: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub(crate) fn silent_count(&self) -> usize {
        self.silent_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn interactive_count(&self) -> usize {
        self.interactive_calls.load(Ordering::SeqCst)
    }

    fn deliver<T: Send + 'static>(&self, callback: Box<dyn FnOnce(T) + Send>, value: T) {
        match self.delivery {
            Delivery::Inline => callback(value),
            Delivery::Thread => {
                thread::spawn(move || callback(value));
            },
        }
    }

    fn reply(&self, reply: &Reply, callback: TokenCallback) {
        let response = match reply {
            Reply::Token(token) => TokenResponse::Success(AuthenticationResult::new(*token)),
            Reply::Error(error) => TokenResponse::Error(error.clone()),
            Reply::Cancel => TokenResponse::Cancelled,
            Reply::Drop => return,
        };
        self.deliver(callback, response);
    }
}

impl IdentityProvider for MockProvider {
    fn list_accounts(&self, callback: AccountsCallback) {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.deliver(callback, self.accounts.clone());
    }

    fn acquire_token_silent(
        &self,
        _scopes: &Scopes,
        account: &Account,
        authority: &str,
        callback: TokenCallback,
    ) {
        self.silent_calls.fetch_add(1, Ordering::SeqCst);
        self.silent_accounts.lock().push(account.id.clone());
        self.authorities.lock().push(authority.to_string());
        self.reply(&self.silent, callback);
    }

    fn acquire_token_interactive(
        &self,
        anchor: Option<ScreenRef>,
        _scopes: &Scopes,
        callback: TokenCallback,
    ) {
        self.interactive_calls.fetch_add(1, Ordering::SeqCst);
        self.anchors.lock().push(
            anchor
                .and_then(|screen| screen.upgrade())
                .map(|screen| screen.name().to_string()),
        );
        self.reply(&self.interactive, callback);
    }

    fn handle_interactive_redirect(&self, redirect: InteractiveRedirect) {
        self.redirects.lock().push(redirect);
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub(crate) fn config() -> BridgeConfig {
    BridgeConfig::new(Scopes::new(["https://graph.microsoft.com/User.Read"]))
}

pub(crate) fn bridge(provider: &Arc<MockProvider>) -> crate::TokenBridge {
    crate::TokenBridge::builder()
        .provider(provider.clone())
        .config(config())
        .build()
        .expect("valid bridge")
}
