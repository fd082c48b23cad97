//! Removes the execution state of one future so it runs again from scratch.

use ignis_core::{DeploymentState, JournalMessage, WipeApplyMessage};
use tracing::info;

use crate::journal::{apply_new_message, load_deployment_state, Journal, JournalError};

#[derive(Debug, thiserror::Error)]
pub enum WipeError {
    #[error("cannot wipe {future_id}: the deployment has not been initialized")]
    UninitializedDeployment { future_id: String },
    #[error("cannot wipe {future_id}: it has no execution state")]
    UnknownFuture { future_id: String },
    #[error("cannot wipe {future_id}: it is a dependency of {}", dependents.join(", "))]
    HasDependents { future_id: String, dependents: Vec<String> },
    #[error(transparent)]
    Journal(#[from] JournalError),
}

/// Records WIPE_APPLY for `future_id` and returns the resulting state.
/// Nothing is written when a precondition fails.
pub fn wipe(journal: &mut dyn Journal, future_id: &str) -> Result<DeploymentState, WipeError> {
    let state = load_deployment_state(journal)?
        .filter(DeploymentState::is_initialized)
        .ok_or_else(|| WipeError::UninitializedDeployment {
            future_id: future_id.to_string(),
        })?;

    if state.execution_state(future_id).is_none() {
        return Err(WipeError::UnknownFuture {
            future_id: future_id.to_string(),
        });
    }

    let dependents = dependents_of(&state, future_id);
    if !dependents.is_empty() {
        return Err(WipeError::HasDependents {
            future_id: future_id.to_string(),
            dependents,
        });
    }

    let message = JournalMessage::WipeApply(WipeApplyMessage {
        future_id: future_id.to_string(),
    });
    let state = apply_new_message(journal, state, &message)?;
    info!(future_id, "wiped execution state");
    Ok(state)
}

fn dependents_of(state: &DeploymentState, future_id: &str) -> Vec<String> {
    state
        .execution_states
        .values()
        .filter(|execution_state| execution_state.base().dependencies.contains(future_id))
        .map(|execution_state| execution_state.id().to_string())
        .collect()
}

#[cfg(test)]
#[path = "wiper_test.rs"]
mod tests;
