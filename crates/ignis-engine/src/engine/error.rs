use crate::batcher::BatchError;
use crate::chain::ChainError;
use crate::journal::JournalError;

/// Errors that stop a run. Per-future failures are recorded in the journal
/// instead and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("the journal was recorded on chain {journal}, but the client is connected to chain {chain}")]
    ChainIdMismatch { journal: i64, chain: i64 },
    #[error("the chain client does not expose any account")]
    NoAccounts,
    #[error(transparent)]
    Journal(#[from] JournalError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error("cannot initialize {future_id}: {message}")]
    Initialize { future_id: String, message: String },
    #[error("transaction of {future_id}/{network_interaction_id} was dropped from the mempool")]
    DroppedTransaction {
        future_id: String,
        network_interaction_id: u32,
    },
    #[error("the nonce of {future_id}/{network_interaction_id} was used by a transaction sent outside of this deployment")]
    ReplacedByUser {
        future_id: String,
        network_interaction_id: u32,
    },
    #[error("sender {sender} has pending transactions not sent by this deployment, wait for them to be confirmed")]
    WaitingForConfirmations { sender: String },
}
