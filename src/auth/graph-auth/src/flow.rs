//! Acquisition state machine.
//!
//! One authentication call walks `ListingAccounts → Silent → Interactive →
//! Done`, skipping `Silent` when no account exists. There is no edge back into
//! `Silent` or `Interactive`, so each acquisition stage runs at most once per
//! call. Events that the current state does not expect are ignored.

use graph_auth_provider::{Account, AuthenticationResult, ProviderError, TokenResponse};

use crate::classify::classify;
use crate::error::{AcquisitionStage, AuthError};

/// State of one authentication call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Waiting for the provider's account list.
    ListingAccounts,
    /// Waiting for silent acquisition.
    Silent,
    /// Waiting for interactive acquisition.
    Interactive,
    /// An outcome was produced.
    Done,
}

/// Provider callback, tagged with the stage that issued the request.
#[derive(Debug)]
pub enum FlowEvent {
    /// Result of listing accounts.
    Accounts(Result<Vec<Account>, ProviderError>),
    /// Terminal response of an acquisition stage.
    Token(AcquisitionStage, TokenResponse),
}

/// What the driver has to do after a transition.
#[derive(Debug)]
pub enum Action {
    /// Start silent acquisition for this account.
    AcquireSilent(Account),
    /// Start interactive acquisition.
    AcquireInteractive,
    /// Publish the outcome.
    Complete(Result<AuthenticationResult, AuthError>),
    /// The event did not match the state; nothing to do.
    Ignore,
}

impl FlowState {
    /// Applies `event` and returns the next state with the action to run.
    pub fn on_event(self, event: FlowEvent) -> (FlowState, Action) {
        match (self, event) {
            (FlowState::ListingAccounts, FlowEvent::Accounts(Ok(accounts))) => {
                match accounts.into_iter().next() {
                    Some(first) => (FlowState::Silent, Action::AcquireSilent(first)),
                    None => (FlowState::Interactive, Action::AcquireInteractive),
                }
            },
            (FlowState::ListingAccounts, FlowEvent::Accounts(Err(error))) => {
                (FlowState::Done, Action::Complete(Err(classify(error))))
            },
            (FlowState::Silent, FlowEvent::Token(AcquisitionStage::Silent, response)) => {
                match response {
                    TokenResponse::Error(error) if error.is_interaction_required() => {
                        (FlowState::Interactive, Action::AcquireInteractive)
                    },
                    response => (
                        FlowState::Done,
                        Action::Complete(terminal(AcquisitionStage::Silent, response)),
                    ),
                }
            },
            (FlowState::Interactive, FlowEvent::Token(AcquisitionStage::Interactive, response)) => (
                FlowState::Done,
                Action::Complete(terminal(AcquisitionStage::Interactive, response)),
            ),
            (state, _) => (state, Action::Ignore),
        }
    }
}

fn terminal(
    stage: AcquisitionStage,
    response: TokenResponse,
) -> Result<AuthenticationResult, AuthError> {
    match response {
        TokenResponse::Success(result) => Ok(result),
        TokenResponse::Error(error) => Err(classify(error)),
        TokenResponse::Cancelled => Err(AuthError::UserCancelled { stage }),
    }
}
