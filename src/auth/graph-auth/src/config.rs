//! Bridge configuration.

use graph_auth_provider::Scopes;
use serde::Deserialize;

use crate::error::AuthError;

/// Authority used for silent acquisition when none is configured.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Name of the header carrying the token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Prefix of the header value, followed directly by the access token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Configuration of a [`TokenBridge`](crate::TokenBridge).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// Scopes requested for every token, in order.
    pub scopes: Scopes,

    /// Authority used for silent acquisition.
    #[serde(default = "default_authority")]
    pub authority: String,
}

fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

impl BridgeConfig {
    /// Creates a configuration using [`DEFAULT_AUTHORITY`].
    pub fn new(scopes: Scopes) -> Self {
        Self {
            scopes,
            authority: default_authority(),
        }
    }

    /// Overrides the authority.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Validates the configuration and normalizes the authority.
    pub fn validate(mut self) -> Result<Self, AuthError> {
        if self.scopes.is_empty() {
            return Err(AuthError::Configuration(
                "at least one scope is required".into(),
            ));
        }
        if self.scopes.iter().any(|scope| scope.trim().is_empty()) {
            return Err(AuthError::Configuration("scopes must not be blank".into()));
        }

        let authority = self.authority.trim();
        if authority.is_empty() {
            return Err(AuthError::Configuration("authority must not be empty".into()));
        }
        if authority.len() != self.authority.len() {
            self.authority = authority.to_string();
        }

        Ok(self)
    }
}
