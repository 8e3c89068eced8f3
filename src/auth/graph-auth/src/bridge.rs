//! Token acquisition bridge.
//!
//! Turns the provider's callback protocol into a single call that either
//! returns a token or an [`AuthError`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use graph_auth_foreground::{ForegroundTracker, LifecycleHost, Screen, TrackerRegistration};
use graph_auth_provider::{
    Account, AuthenticationResult, IdentityProvider, InteractiveRedirect, ProviderError, Scopes,
    TokenResponse,
};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::error::{AcquisitionStage, AuthError};
use crate::flow::{Action, FlowEvent, FlowState};
use crate::outcome::{self, Completion, WaitError, Waiter};

type Outcome = Result<AuthenticationResult, AuthError>;

/// Blocking façade over an asynchronous [`IdentityProvider`].
///
/// Each call to [`authenticate`](TokenBridge::authenticate) queries the
/// provider from scratch; nothing is cached between calls.
pub struct TokenBridge {
    provider: Arc<dyn IdentityProvider>,
    tracker: Arc<ForegroundTracker>,
    config: BridgeConfig,
    attempts: AtomicU64,
    _registration: Option<TrackerRegistration>,
}

impl TokenBridge {
    /// Creates a bridge that reads the foreground screen from `tracker`.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        tracker: Arc<ForegroundTracker>,
        config: BridgeConfig,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            provider,
            tracker,
            config: config.validate()?,
            attempts: AtomicU64::new(0),
            _registration: None,
        })
    }

    /// Starts building a bridge.
    pub fn builder() -> TokenBridgeBuilder {
        TokenBridgeBuilder::default()
    }

    /// Scopes requested for every token.
    pub fn scopes(&self) -> &Scopes {
        &self.config.scopes
    }

    /// Authority used for silent acquisition.
    pub fn authority(&self) -> &str {
        &self.config.authority
    }

    /// The foreground tracker used to anchor interactive sign-in.
    pub fn tracker(&self) -> &Arc<ForegroundTracker> {
        &self.tracker
    }

    /// Acquires a token, blocking the calling thread until the provider
    /// reports a terminal result.
    ///
    /// There is no timeout: a provider that never answers blocks the caller
    /// indefinitely. A provider that drops its callback instead yields
    /// [`AuthError::Abandoned`].
    ///
    /// Blocking is allowed outside any tokio runtime and on multi-thread
    /// runtimes. On a current-thread runtime the call fails with
    /// [`AuthError::BlockingInRuntime`] before the provider is contacted; use
    /// [`authenticate_async`](TokenBridge::authenticate_async) there.
    pub fn authenticate(&self) -> Result<AuthenticationResult, AuthError> {
        if let Err(err) = outcome::ensure_can_block() {
            warn!(provider = self.provider.name(), "Refusing to block a current-thread runtime");
            return Err(err.into());
        }
        let (attempt, waiter) = self.start();
        Self::finish(attempt, waiter.wait())
    }

    /// Async counterpart of [`authenticate`](TokenBridge::authenticate).
    pub async fn authenticate_async(&self) -> Result<AuthenticationResult, AuthError> {
        let (attempt, waiter) = self.start();
        Self::finish(attempt, waiter.wait_async().await)
    }

    /// Forwards the result of an interactive sign-in to the provider.
    pub fn handle_interactive_redirect(&self, redirect: InteractiveRedirect) {
        debug!(
            provider = self.provider.name(),
            request_code = redirect.request_code,
            result_code = redirect.result_code,
            "Forwarding interactive redirect"
        );
        self.provider.handle_interactive_redirect(redirect);
    }

    fn start(&self) -> (u64, Waiter<Outcome>) {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let (completion, waiter) = outcome::channel();

        debug!(attempt, provider = self.provider.name(), "Authenticating request");

        let acquisition = Arc::new(Acquisition {
            attempt,
            provider: Arc::clone(&self.provider),
            tracker: Arc::clone(&self.tracker),
            scopes: self.config.scopes.clone(),
            authority: self.config.authority.clone(),
            state: Mutex::new(FlowState::ListingAccounts),
            completion,
        });
        acquisition.list_accounts();

        // Only the provider's callbacks keep the acquisition alive from here
        // on. If it drops all of them the completion goes with it and the
        // waiter wakes up closed.
        (attempt, waiter)
    }

    fn finish(attempt: u64, outcome: Result<Outcome, WaitError>) -> Outcome {
        let outcome = outcome.unwrap_or_else(|err| Err(err.into()));
        match &outcome {
            Ok(result) => debug!(attempt, expires_at = ?result.expires_at, "Token acquired"),
            Err(err) => warn!(attempt, error = %err, "Authentication failed"),
        }
        outcome
    }
}

/// State shared between the provider callbacks of one authentication call.
struct Acquisition {
    attempt: u64,
    provider: Arc<dyn IdentityProvider>,
    tracker: Arc<ForegroundTracker>,
    scopes: Scopes,
    authority: String,
    state: Mutex<FlowState>,
    completion: Completion<Outcome>,
}

impl Acquisition {
    fn list_accounts(self: &Arc<Self>) {
        let this = Arc::clone(self);
        self.provider.list_accounts(Box::new(
            move |accounts: Result<Vec<Account>, ProviderError>| {
                this.handle(FlowEvent::Accounts(accounts));
            },
        ));
    }

    fn handle(self: &Arc<Self>, event: FlowEvent) {
        // The lock is released before the provider is called again; providers
        // are allowed to answer synchronously from inside the call.
        let (from, to, action) = {
            let mut state = self.state.lock();
            let from = *state;
            let (to, action) = from.on_event(event);
            *state = to;
            (from, to, action)
        };

        match action {
            Action::AcquireSilent(account) => {
                debug!(attempt = self.attempt, account_id = %account.id, "Acquiring token silently");
                self.acquire_silent(&account);
            },
            Action::AcquireInteractive => {
                if from == FlowState::Silent {
                    debug!(attempt = self.attempt, "Silent acquisition requires interaction");
                }
                self.acquire_interactive();
            },
            Action::Complete(outcome) => {
                if !self.completion.complete(outcome) {
                    warn!(attempt = self.attempt, "Outcome already published");
                }
            },
            Action::Ignore => {
                warn!(
                    attempt = self.attempt,
                    state = ?to,
                    "Ignoring unexpected provider callback"
                );
            },
        }
    }

    fn acquire_silent(self: &Arc<Self>, account: &Account) {
        let this = Arc::clone(self);
        self.provider.acquire_token_silent(
            &self.scopes,
            account,
            &self.authority,
            Box::new(move |response: TokenResponse| {
                this.handle(FlowEvent::Token(AcquisitionStage::Silent, response));
            }),
        );
    }

    fn acquire_interactive(self: &Arc<Self>) {
        let anchor = self.tracker.current();
        let screen = anchor
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|screen| screen.name().to_string());
        match screen {
            Some(screen) => {
                debug!(attempt = self.attempt, screen = %screen, "Acquiring token interactively");
            },
            None if anchor.is_some() => warn!(
                attempt = self.attempt,
                "Foreground screen is gone; interactive sign-in anchor is stale"
            ),
            None => warn!(
                attempt = self.attempt,
                "No foreground screen recorded; interactive sign-in has no anchor"
            ),
        }

        let this = Arc::clone(self);
        self.provider.acquire_token_interactive(
            anchor,
            &self.scopes,
            Box::new(move |response: TokenResponse| {
                this.handle(FlowEvent::Token(AcquisitionStage::Interactive, response));
            }),
        );
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        let state = *self.state.get_mut();
        if state != FlowState::Done {
            warn!(
                attempt = self.attempt,
                state = ?state,
                "Identity provider dropped its callback without answering"
            );
        }
    }
}

/// Builder for [`TokenBridge`].
#[derive(Default)]
pub struct TokenBridgeBuilder {
    provider: Option<Arc<dyn IdentityProvider>>,
    config: Option<BridgeConfig>,
    tracker: Option<Arc<ForegroundTracker>>,
    registration: Option<TrackerRegistration>,
}

impl TokenBridgeBuilder {
    /// Sets the identity provider.
    pub fn provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses a tracker owned elsewhere.
    pub fn tracker(mut self, tracker: Arc<ForegroundTracker>) -> Self {
        self.tracker = Some(tracker);
        self.registration = None;
        self
    }

    /// Registers a new tracker with `host`; the bridge owns the registration
    /// and unregisters it when dropped.
    pub fn lifecycle_host(
        mut self,
        host: Arc<dyn LifecycleHost>,
        initial: Option<&Arc<dyn Screen>>,
    ) -> Self {
        let registration = ForegroundTracker::register(host, initial);
        self.tracker = Some(registration.tracker());
        self.registration = Some(registration);
        self
    }

    /// Builds the bridge.
    ///
    /// Without a tracker, interactive sign-in is started without an anchor.
    pub fn build(self) -> Result<TokenBridge, AuthError> {
        let provider = self
            .provider
            .ok_or_else(|| AuthError::Configuration("identity provider is required".into()))?;
        let config = self
            .config
            .ok_or_else(|| AuthError::Configuration("bridge configuration is required".into()))?;
        let tracker = self
            .tracker
            .unwrap_or_else(|| Arc::new(ForegroundTracker::empty()));

        let mut bridge = TokenBridge::new(provider, tracker, config)?;
        bridge._registration = self.registration;
        Ok(bridge)
    }
}
