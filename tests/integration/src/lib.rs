//! Integration tests for the graph-auth token bridge.
//!
//! These tests drive the bridge against the scripted provider, whose callbacks
//! run on a real tokio runtime, and check the complete silent/interactive flow
//! from the caller's point of view.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::sync::Arc;

use anyhow::{Context, Result};
use graph_auth::{
    Account, AuthError, AuthenticationResult, AuthorizableRequest, BridgeConfig, Scopes, Screen,
    TokenBridge,
};
use graph_auth_foreground::{LifecycleEvent, LifecycleRegistry};
use graph_auth_provider_static::{ScriptedResponse, StaticIdentityProvider};
use tokio::runtime::Handle;

/// Scope used by every test bridge.
pub const GRAPH_USER_READ: &str = "https://graph.microsoft.com/User.Read";

// ============================================================================
// Test Screens
// ============================================================================

/// A named screen owned by the test.
pub struct TestScreen(pub String);

impl Screen for TestScreen {
    fn name(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Test App
// ============================================================================

/// A host application with one bridge wired to a scripted provider.
pub struct TestApp {
    pub provider: Arc<StaticIdentityProvider>,
    pub host: Arc<LifecycleRegistry>,
    pub bridge: Arc<TokenBridge>,
    /// Screens shown so far; the tracker only holds weak references.
    pub screens: Vec<Arc<dyn Screen>>,
}

impl TestApp {
    /// Builds an app whose provider knows `accounts` and answers with
    /// `silent` / `interactive`. A "main" screen is in the foreground.
    pub fn start(
        runtime: Handle,
        accounts: &[&str],
        silent: ScriptedResponse,
        interactive: ScriptedResponse,
    ) -> Result<Self> {
        let mut builder = StaticIdentityProvider::builder(runtime)
            .silent(silent)
            .interactive(interactive);
        for id in accounts {
            builder = builder.account(Account::new(*id));
        }
        let provider = Arc::new(builder.build());

        let host = Arc::new(LifecycleRegistry::new());
        let main: Arc<dyn Screen> = Arc::new(TestScreen("main".into()));

        let bridge = TokenBridge::builder()
            .provider(provider.clone())
            .config(BridgeConfig::new(Scopes::new([GRAPH_USER_READ])))
            .lifecycle_host(host.clone(), Some(&main))
            .build()
            .context("Failed to build bridge")?;

        Ok(Self {
            provider,
            host,
            bridge: Arc::new(bridge),
            screens: vec![main],
        })
    }

    /// Brings a new screen to the foreground.
    pub fn show(&mut self, name: &str) {
        let screen: Arc<dyn Screen> = Arc::new(TestScreen(name.into()));
        for event in [LifecycleEvent::Created, LifecycleEvent::Started, LifecycleEvent::Resumed] {
            self.host.dispatch(event, &screen);
        }
        self.screens.push(screen);
    }

    /// Runs the blocking `authenticate` off the async workers.
    pub async fn authenticate(&self) -> Result<AuthenticationResult, AuthError> {
        let bridge = Arc::clone(&self.bridge);
        tokio::task::spawn_blocking(move || bridge.authenticate())
            .await
            .expect("authentication task panicked")
    }

    /// Runs the blocking `decorate` off the async workers.
    pub async fn decorate<R>(&self, request: R) -> Result<R, AuthError>
    where
        R: AuthorizableRequest + Send + 'static,
    {
        let bridge = Arc::clone(&self.bridge);
        tokio::task::spawn_blocking(move || bridge.decorate(request))
            .await
            .expect("decorate task panicked")
    }
}

/// A bare GET request against Microsoft Graph.
pub fn graph_me_request() -> http::Request<()> {
    http::Request::builder()
        .uri("https://graph.microsoft.com/v1.0/me")
        .body(())
        .expect("valid request")
}

/// Returns the `Authorization` header of `request` as a string.
pub fn authorization(request: &http::Request<()>) -> Option<&str> {
    request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use graph_auth::{AcquisitionStage, AuthErrorKind, ProviderError};
    use std::error::Error as _;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_accounts_interactive_token_decorates_request() {
        let app = TestApp::start(
            Handle::current(),
            &[],
            ScriptedResponse::token("never"),
            ScriptedResponse::token("abc123"),
        )
        .unwrap();

        let request = app.decorate(graph_me_request()).await.unwrap();

        assert_eq!(authorization(&request), Some("Bearer abc123"));
        let calls = app.provider.calls();
        assert_eq!(calls.silent, 0);
        assert_eq!(calls.interactive, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_one_account_silent_token() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::token("sil0"),
            ScriptedResponse::token("never"),
        )
        .unwrap();

        let request = app.decorate(graph_me_request()).await.unwrap();

        assert_eq!(authorization(&request), Some("Bearer sil0"));
        assert_eq!(app.provider.calls().interactive, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_interaction_required_then_interactive() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::Error(ProviderError::interaction_required(
                "invalid_grant",
                "AADSTS65001: consent required",
            )),
            ScriptedResponse::token("int1"),
        )
        .unwrap();

        let request = app.decorate(graph_me_request()).await.unwrap();

        assert_eq!(authorization(&request), Some("Bearer int1"));
        let calls = app.provider.calls();
        assert_eq!(calls.silent, 1);
        assert_eq!(calls.interactive, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_silent_service_error_surfaces() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::Error(ProviderError::service(
                "temporarily_unavailable",
                "AADSTS90033: transient error",
            )),
            ScriptedResponse::token("never"),
        )
        .unwrap();

        let err = app.authenticate().await.unwrap_err();

        assert_eq!(err.kind(), AuthErrorKind::ServiceOrConfig);
        assert_eq!(
            err.to_string(),
            "service/config issue communicating with the identity service"
        );
        assert_eq!(
            err.source().unwrap().to_string(),
            "AADSTS90033: transient error"
        );
        assert_eq!(app.provider.calls().interactive, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_silent_cancel_skips_interactive() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::Cancel,
            ScriptedResponse::token("never"),
        )
        .unwrap();

        let err = app.authenticate().await.unwrap_err();

        assert!(matches!(
            err,
            AuthError::UserCancelled {
                stage: AcquisitionStage::Silent
            }
        ));
        assert_eq!(app.provider.calls().interactive, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_first_account_is_used() {
        let app = TestApp::start(
            Handle::current(),
            &["ada", "grace", "linus"],
            ScriptedResponse::token("sil0"),
            ScriptedResponse::Cancel,
        )
        .unwrap();

        let result = app.authenticate().await.unwrap();

        assert_eq!(result.account.map(|a| a.id), Some("ada".to_string()));
        assert_eq!(app.provider.silent_accounts(), vec![Account::new("ada")]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_interactive_anchor_follows_foreground() {
        let mut app = TestApp::start(
            Handle::current(),
            &[],
            ScriptedResponse::Cancel,
            ScriptedResponse::token("abc123"),
        )
        .unwrap();

        app.authenticate().await.unwrap();
        app.show("settings");
        app.authenticate().await.unwrap();

        assert_eq!(
            app.provider.interactive_anchors(),
            vec![Some("main".to_string()), Some("settings".to_string())]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_abandoned_callback_does_not_hang() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::Abandon,
            ScriptedResponse::token("never"),
        )
        .unwrap();

        let err = tokio::time::timeout(Duration::from_secs(5), app.authenticate())
            .await
            .expect("authenticate hung")
            .unwrap_err();

        assert!(matches!(err, AuthError::Abandoned));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_calls_get_their_own_outcome() {
        let provider = Arc::new(
            StaticIdentityProvider::builder(Handle::current())
                .account(Account::new("ada"))
                .silent(ScriptedResponse::token("sil0"))
                .latency(Duration::from_millis(20))
                .build(),
        );
        let bridge = Arc::new(
            TokenBridge::builder()
                .provider(provider.clone())
                .config(BridgeConfig::new(Scopes::new([GRAPH_USER_READ])))
                .build()
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bridge = Arc::clone(&bridge);
                tokio::task::spawn_blocking(move || bridge.authenticate())
            })
            .collect();
        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.access_token.secret(), "sil0");
        }

        let calls = provider.calls();
        assert_eq!(calls.list_accounts, 8);
        assert_eq!(calls.silent, 8);
        assert_eq!(calls.interactive, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_async_entry_point() {
        let app = TestApp::start(
            Handle::current(),
            &[],
            ScriptedResponse::Cancel,
            ScriptedResponse::token("abc123"),
        )
        .unwrap();

        let request = app
            .bridge
            .decorate_async(graph_me_request())
            .await
            .unwrap();

        assert_eq!(authorization(&request), Some("Bearer abc123"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_decorated_reqwest_request_reaches_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":\"ada\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let app = TestApp::start(
            Handle::current(),
            &[],
            ScriptedResponse::Cancel,
            ScriptedResponse::token("abc123"),
        )
        .unwrap();

        let client = reqwest::Client::new();
        let request = client
            .get(format!("{}/v1.0/me", server.uri()))
            .build()
            .unwrap();
        let request = app.decorate(request).await.unwrap();

        let resp = client.execute(request).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_blocking_decorate_on_runtime_worker() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::token("sil0"),
            ScriptedResponse::Cancel,
        )
        .unwrap();

        let request = app.bridge.decorate(graph_me_request()).unwrap();

        assert_eq!(authorization(&request), Some("Bearer sil0"));
    }

    #[tokio::test]
    async fn test_blocking_decorate_on_current_thread_runtime_is_refused() {
        let app = TestApp::start(
            Handle::current(),
            &["ada"],
            ScriptedResponse::token("sil0"),
            ScriptedResponse::Cancel,
        )
        .unwrap();

        let err = app.bridge.decorate(graph_me_request()).unwrap_err();

        assert!(matches!(err, AuthError::BlockingInRuntime));
        assert_eq!(app.provider.calls().list_accounts, 0);
    }

    #[test]
    fn test_blocking_caller_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let app = TestApp::start(
            runtime.handle().clone(),
            &["ada"],
            ScriptedResponse::token("sil0"),
            ScriptedResponse::Cancel,
        )
        .unwrap();

        let mut request = graph_me_request();
        app.bridge.authenticate_request(&mut request).unwrap();

        assert_eq!(authorization(&request), Some("Bearer sil0"));
    }
}
