//! Provider error classification.

use graph_auth_provider::ProviderError;

use crate::error::AuthError;

/// Maps a provider error onto the normalized [`AuthError`].
///
/// Client and service failures get a category message with the provider
/// error as their source; everything else is the provider error itself.
/// Cancellation is not a provider error and never goes through here.
pub fn classify(error: ProviderError) -> AuthError {
    match error {
        source @ ProviderError::Client { .. } => AuthError::ClientLibrary { source },
        source @ ProviderError::Service { .. } => AuthError::ServiceOrConfig { source },
        source => AuthError::Provider { source },
    }
}
