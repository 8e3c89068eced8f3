//! Request decoration.

use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use zeroize::Zeroizing;

use graph_auth_provider::AccessToken;

use crate::bridge::TokenBridge;
use crate::config::BEARER_PREFIX;
use crate::error::AuthError;

/// An outbound request whose headers can be changed.
pub trait AuthorizableRequest {
    /// Adds `name`, replacing any existing values.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
}

impl<B> AuthorizableRequest for http::Request<B> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }
}

impl AuthorizableRequest for HeaderMap {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.insert(name, value);
    }
}

impl AuthorizableRequest for reqwest::Request {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }
}

/// Pipeline hook that authenticates requests before they are sent.
pub trait AuthenticationProvider: Send + Sync {
    /// Attaches credentials to `request`, blocking until they are available.
    ///
    /// On error the request is left untouched. Implementations may block the
    /// calling thread; on a thread driving a current-thread tokio runtime the
    /// token bridge returns [`AuthError::BlockingInRuntime`] instead.
    fn authenticate_request(&self, request: &mut dyn AuthorizableRequest) -> Result<(), AuthError>;
}

/// Builds the `Authorization` header value for `token`.
///
/// The value is `"Bearer "` followed by the token and is marked sensitive.
pub fn bearer_header_value(token: &AccessToken) -> Result<HeaderValue, AuthError> {
    let raw = Zeroizing::new(format!("{BEARER_PREFIX}{}", token.secret()));
    let mut value = HeaderValue::from_str(&raw)?;
    value.set_sensitive(true);
    Ok(value)
}

impl TokenBridge {
    /// Authenticates `request` in place.
    ///
    /// The token is acquired and the header value built before the request is
    /// touched, so a failure leaves it unchanged. Blocks like
    /// [`authenticate`](TokenBridge::authenticate), with the same
    /// current-thread runtime restriction.
    pub fn authenticate_request<R>(&self, request: &mut R) -> Result<(), AuthError>
    where
        R: AuthorizableRequest + ?Sized,
    {
        let result = self.authenticate()?;
        let value = bearer_header_value(&result.access_token)?;
        request.set_header(AUTHORIZATION, value);
        Ok(())
    }

    /// Returns `request` with the `Authorization` header set.
    ///
    /// Blocks like [`authenticate`](TokenBridge::authenticate).
    pub fn decorate<R: AuthorizableRequest>(&self, mut request: R) -> Result<R, AuthError> {
        self.authenticate_request(&mut request)?;
        Ok(request)
    }

    /// Async counterpart of [`decorate`](TokenBridge::decorate).
    pub async fn decorate_async<R: AuthorizableRequest>(
        &self,
        mut request: R,
    ) -> Result<R, AuthError> {
        let result = self.authenticate_async().await?;
        let value = bearer_header_value(&result.access_token)?;
        request.set_header(AUTHORIZATION, value);
        Ok(request)
    }
}

impl AuthenticationProvider for TokenBridge {
    fn authenticate_request(&self, request: &mut dyn AuthorizableRequest) -> Result<(), AuthError> {
        TokenBridge::authenticate_request(self, request)
    }
}
