//! Append-only storage of journal messages and the state rebuilt from it.

mod file;
mod memory;

use ignis_core::{DeploymentState, JournalMessage};

use crate::reducer::{deployment_state_reducer, replay, ReducerError};

pub use file::FileJournal;
pub use memory::MemoryJournal;

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid journal line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Reducer(#[from] ReducerError),
}

pub trait Journal {
    /// Durably stores `message` after every previously appended one.
    fn append(&mut self, message: &JournalMessage) -> Result<(), JournalError>;

    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError>;
}

/// Replays the journal. `None` when nothing has been recorded yet.
pub fn load_deployment_state(journal: &dyn Journal) -> Result<Option<DeploymentState>, JournalError> {
    let messages = journal.read_all()?;
    if messages.is_empty() {
        return Ok(None);
    }
    Ok(Some(replay(messages.iter())?))
}

/// Records `message` and returns the state it leads to. Messages the reducer
/// rejects are never written; the new state is only handed out once the
/// message is stored.
pub fn apply_new_message(
    journal: &mut dyn Journal,
    state: DeploymentState,
    message: &JournalMessage,
) -> Result<DeploymentState, JournalError> {
    let next = deployment_state_reducer(Some(state), Some(message))?;
    journal.append(message)?;
    Ok(next)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
