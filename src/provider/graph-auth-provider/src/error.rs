//! Provider error types.

use thiserror::Error;

/// Errors reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Failure inside the identity library (malformed configuration, internal fault).
    #[error("{message}")]
    Client {
        /// Provider error code.
        code: String,
        /// Provider message.
        message: String,
    },

    /// Failure while talking to the identity service (network, STS, tenant configuration).
    #[error("{message}")]
    Service {
        /// Provider error code.
        code: String,
        /// Provider message.
        message: String,
        /// HTTP status returned by the service, when known.
        status: Option<u16>,
    },

    /// Silent acquisition cannot proceed without user interaction.
    #[error("{message}")]
    InteractionRequired {
        /// Provider error code.
        code: String,
        /// Provider message.
        message: String,
    },

    /// Any other provider failure.
    #[error("{message}")]
    Other {
        /// Provider message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a [`ProviderError::Client`].
    pub fn client(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Client {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a [`ProviderError::Service`] without an HTTP status.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Creates a [`ProviderError::InteractionRequired`].
    pub fn interaction_required(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InteractionRequired {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a [`ProviderError::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The provider's raw message.
    pub fn message(&self) -> &str {
        match self {
            Self::Client { message, .. }
            | Self::Service { message, .. }
            | Self::InteractionRequired { message, .. }
            | Self::Other { message } => message,
        }
    }

    /// The provider's error code, if the variant carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Client { code, .. }
            | Self::Service { code, .. }
            | Self::InteractionRequired { code, .. } => Some(code),
            Self::Other { .. } => None,
        }
    }

    /// Whether this error asks for interactive acquisition.
    pub fn is_interaction_required(&self) -> bool {
        matches!(self, Self::InteractionRequired { .. })
    }
}
