//! Execution strategies decide *what* to send for a future; the engine
//! decides *when* and records what happened.

mod artifact;
mod basic;
mod codec;

use futures::future::LocalBoxFuture;
use ignis_core::{
    CallExecutionResult, DeploymentExecutionResult, ExecutionResult, ExecutionState, ExecutionStateCompleteMessage,
    JournalMessage, NetworkInteractionRequest, SendDataExecutionResult, StaticCallExecutionResult, StrategyConfig,
};

pub use artifact::{Artifact, ArtifactError, ArtifactResolver, LinkReference, LinkReferences};
pub use basic::{BasicStrategy, BASIC_STRATEGY_NAME};
pub use codec::{AbiCodec, CodecError};

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("{kind} {future_id} cannot be handled: {message}")]
    UnexpectedState {
        kind: &'static str,
        future_id: String,
        message: String,
    },
}

/// Final result a strategy hands back, one variant per kind that talks to
/// the network.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Deployment(DeploymentExecutionResult),
    Call(CallExecutionResult),
    StaticCall(StaticCallExecutionResult),
    SendData(SendDataExecutionResult),
}

/// Failure recorded as the result of a future.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionFailure {
    Reverted { tx_hash: String },
    StaticCall(String),
    Strategy(String),
    Simulation(String),
    Held { held_id: u64, reason: String },
}

impl ExecutionFailure {
    fn into_result<S>(self) -> ExecutionResult<S> {
        match self {
            Self::Reverted { tx_hash } => ExecutionResult::RevertedTransaction { tx_hash },
            Self::StaticCall(error) => ExecutionResult::StaticCallError { error },
            Self::Strategy(error) => ExecutionResult::StrategyError { error },
            Self::Simulation(error) => ExecutionResult::SimulationError { error },
            Self::Held { held_id, reason } => ExecutionResult::StrategyHeld { held_id, reason },
        }
    }
}

impl StrategyOutcome {
    /// Outcome of the right kind for `state`. `None` for kinds that never
    /// record a completion.
    pub fn failure(state: &ExecutionState, failure: ExecutionFailure) -> Option<Self> {
        let outcome = match state {
            ExecutionState::Deployment(_) => Self::Deployment(failure.into_result()),
            ExecutionState::Call(_) => Self::Call(failure.into_result()),
            ExecutionState::StaticCall(_) => Self::StaticCall(failure.into_result()),
            ExecutionState::SendData(_) => Self::SendData(failure.into_result()),
            ExecutionState::EncodeFunctionCall(_) | ExecutionState::ContractAt(_) | ExecutionState::ReadEventArgument(_) => {
                return None
            }
        };
        Some(outcome)
    }

    pub fn into_message(self, future_id: &str) -> JournalMessage {
        let future_id = future_id.to_string();
        match self {
            Self::Deployment(result) => {
                JournalMessage::DeploymentExecutionStateComplete(ExecutionStateCompleteMessage { future_id, result })
            }
            Self::Call(result) => JournalMessage::CallExecutionStateComplete(ExecutionStateCompleteMessage { future_id, result }),
            Self::StaticCall(result) => {
                JournalMessage::StaticCallExecutionStateComplete(ExecutionStateCompleteMessage { future_id, result })
            }
            Self::SendData(result) => {
                JournalMessage::SendDataExecutionStateComplete(ExecutionStateCompleteMessage { future_id, result })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyStep {
    Request(NetworkInteractionRequest),
    Complete(StrategyOutcome),
}

pub trait ExecutionStrategy {
    fn name(&self) -> &str;

    fn config(&self) -> StrategyConfig {
        StrategyConfig::new()
    }

    /// Next step for a future whose next action is to run the strategy.
    /// Stateless: everything it needs is in `state`.
    fn next_step<'a>(&'a self, state: &'a ExecutionState) -> LocalBoxFuture<'a, Result<StrategyStep, StrategyError>>;
}
