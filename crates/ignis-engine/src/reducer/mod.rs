//! The deployment state reducer.
//!
//! `deployment_state_reducer` is the only way a [`DeploymentState`] changes.
//! It is pure: replaying the same journal always yields the same state.

mod execution_state;
mod network_interaction;

use ignis_core::{DeploymentState, JournalMessage};

pub use execution_state::initialize_execution_state;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReducerError {
    /// The journal contradicts the state it is applied to. Never retried.
    #[error("invariant violation: {0}")]
    Invariant(String),
}

impl ReducerError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}

pub fn deployment_state_reducer(
    state: Option<DeploymentState>,
    message: Option<&JournalMessage>,
) -> Result<DeploymentState, ReducerError> {
    let mut state = state.unwrap_or_default();
    let Some(message) = message else {
        return Ok(state);
    };

    match message {
        JournalMessage::DeploymentInitialize(initialize) => {
            state.chain_id = initialize.chain_id;
        }
        JournalMessage::WipeApply(wipe) => {
            state.execution_states.remove(&wipe.future_id);
        }
        _ => execution_state::apply(&mut state, message)?,
    }
    Ok(state)
}

/// Folds a sequence of messages from the empty state.
pub fn replay<'a>(messages: impl IntoIterator<Item = &'a JournalMessage>) -> Result<DeploymentState, ReducerError> {
    messages
        .into_iter()
        .try_fold(DeploymentState::default(), |state, message| {
            deployment_state_reducer(Some(state), Some(message))
        })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
