//! Authentication error types.

use std::fmt;

use graph_auth_provider::ProviderError;
use thiserror::Error;

use crate::outcome::WaitError;

/// Acquisition stage a cancellation happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionStage {
    /// Silent acquisition for a known account.
    Silent,
    /// Interactive sign-in.
    Interactive,
}

impl fmt::Display for AcquisitionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionStage::Silent => f.write_str("silent"),
            AcquisitionStage::Interactive => f.write_str("interactive"),
        }
    }
}

/// Errors returned to callers of the token bridge.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity library failed internally (malformed configuration, internal fault).
    #[error("client-side failure inside the authentication library")]
    ClientLibrary {
        /// Original provider error.
        source: ProviderError,
    },

    /// The identity service could not be reached or rejected the configuration.
    #[error("service/config issue communicating with the identity service")]
    ServiceOrConfig {
        /// Original provider error.
        source: ProviderError,
    },

    /// Any other provider failure, carrying the provider's own message.
    #[error(transparent)]
    Provider {
        /// Original provider error.
        source: ProviderError,
    },

    /// The user dismissed the sign-in.
    #[error("user cancelled {stage} authentication")]
    UserCancelled {
        /// Stage that was cancelled.
        stage: AcquisitionStage,
    },

    /// The provider dropped a callback without ever answering.
    #[error("identity provider dropped the request without answering")]
    Abandoned,

    /// The blocking entry points were called on a thread driving a
    /// current-thread tokio runtime.
    #[error("cannot block a current-thread tokio runtime; use the async entry points")]
    BlockingInRuntime,

    /// The access token cannot be carried in an HTTP header.
    #[error("access token is not a valid header value")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// Bridge configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Flat category of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    /// See [`AuthError::ClientLibrary`].
    ClientLibrary,
    /// See [`AuthError::ServiceOrConfig`].
    ServiceOrConfig,
    /// See [`AuthError::Provider`].
    Uncategorized,
    /// See [`AuthError::UserCancelled`].
    UserCancelled,
    /// See [`AuthError::Abandoned`].
    Abandoned,
    /// See [`AuthError::BlockingInRuntime`].
    BlockingInRuntime,
    /// See [`AuthError::InvalidHeader`].
    InvalidHeader,
    /// See [`AuthError::Configuration`].
    Configuration,
}

impl AuthError {
    /// Returns the category of this error.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::ClientLibrary { .. } => AuthErrorKind::ClientLibrary,
            AuthError::ServiceOrConfig { .. } => AuthErrorKind::ServiceOrConfig,
            AuthError::Provider { .. } => AuthErrorKind::Uncategorized,
            AuthError::UserCancelled { .. } => AuthErrorKind::UserCancelled,
            AuthError::Abandoned => AuthErrorKind::Abandoned,
            AuthError::BlockingInRuntime => AuthErrorKind::BlockingInRuntime,
            AuthError::InvalidHeader(_) => AuthErrorKind::InvalidHeader,
            AuthError::Configuration(_) => AuthErrorKind::Configuration,
        }
    }

    /// The provider error behind this error, if any.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            AuthError::ClientLibrary { source }
            | AuthError::ServiceOrConfig { source }
            | AuthError::Provider { source } => Some(source),
            _ => None,
        }
    }

    /// Whether the user cancelled the sign-in.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AuthError::UserCancelled { .. })
    }
}

impl From<WaitError> for AuthError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Closed => AuthError::Abandoned,
            WaitError::CurrentThreadRuntime => AuthError::BlockingInRuntime,
        }
    }
}
