use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::execution_state::ExecutionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSuccess {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSuccess {
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCallSuccess {
    pub value: Value,
}

/// Outcome recorded by a `*_EXECUTION_STATE_COMPLETE` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionResult<S> {
    Success(S),
    RevertedTransaction { tx_hash: String },
    StaticCallError { error: String },
    StrategyError { error: String },
    StrategyHeld { held_id: u64, reason: String },
    SimulationError { error: String },
}

pub type DeploymentExecutionResult = ExecutionResult<DeploymentSuccess>;
pub type CallExecutionResult = ExecutionResult<TransactionSuccess>;
pub type SendDataExecutionResult = ExecutionResult<TransactionSuccess>;
pub type StaticCallExecutionResult = ExecutionResult<StaticCallSuccess>;

impl<S> ExecutionResult<S> {
    pub fn status(&self) -> ExecutionStatus {
        match self {
            Self::Success(_) => ExecutionStatus::Success,
            Self::StrategyHeld { .. } => ExecutionStatus::Held,
            Self::RevertedTransaction { .. }
            | Self::StaticCallError { .. }
            | Self::StrategyError { .. }
            | Self::SimulationError { .. } => ExecutionStatus::Failed,
        }
    }

    pub fn success(&self) -> Option<&S> {
        match self {
            Self::Success(success) => Some(success),
            _ => None,
        }
    }

    /// Human readable failure description, `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::RevertedTransaction { tx_hash } => Some(format!("transaction {tx_hash} reverted")),
            Self::StaticCallError { error } => Some(format!("static call failed: {error}")),
            Self::StrategyError { error } => Some(format!("strategy failed: {error}")),
            Self::StrategyHeld { held_id, reason } => Some(format!("held ({held_id}): {reason}")),
            Self::SimulationError { error } => Some(format!("simulation failed: {error}")),
        }
    }
}
