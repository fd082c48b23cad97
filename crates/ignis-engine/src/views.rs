//! Read-only projections of a [`DeploymentState`].

use ignis_core::{
    DeploymentState, ExecutionResult, ExecutionState, ExecutionStatus, NetworkInteraction, OnchainInteraction,
    StaticCallInteraction, Transaction,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub id: String,
    pub contract_name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldFuture {
    pub future_id: String,
    pub held_id: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFuture {
    pub future_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub chain_id: i64,
    pub started: Vec<String>,
    pub successful: Vec<String>,
    pub held: Vec<HeldFuture>,
    pub timed_out: Vec<String>,
    pub failed: Vec<FailedFuture>,
    pub contracts: Vec<DeployedContract>,
}

impl StatusResult {
    pub fn is_complete(&self) -> bool {
        self.started.is_empty() && self.held.is_empty() && self.timed_out.is_empty() && self.failed.is_empty()
    }
}

/// Contracts of successful deployments plus every `contract_at`, ordered by
/// future id.
pub fn find_deployed_contracts(state: &DeploymentState) -> Vec<DeployedContract> {
    state
        .execution_states
        .values()
        .filter_map(|execution_state| match execution_state.as_ref() {
            ExecutionState::Deployment(deployment) => deployment
                .result
                .as_ref()
                .and_then(ExecutionResult::success)
                .map(|success| DeployedContract {
                    id: deployment.base.id.clone(),
                    contract_name: deployment.contract_name.clone(),
                    address: success.address.clone(),
                }),
            ExecutionState::ContractAt(contract_at) if contract_at.base.status == ExecutionStatus::Success => {
                Some(DeployedContract {
                    id: contract_at.base.id.clone(),
                    contract_name: contract_at.contract_name.clone(),
                    address: contract_at.contract_address.clone(),
                })
            }
            _ => None,
        })
        .collect()
}

pub fn find_status(state: &DeploymentState) -> StatusResult {
    let mut status = StatusResult {
        chain_id: state.chain_id,
        contracts: find_deployed_contracts(state),
        ..StatusResult::default()
    };

    for execution_state in state.execution_states.values() {
        let future_id = execution_state.id().to_string();
        match execution_state.status() {
            ExecutionStatus::Started => status.started.push(future_id),
            ExecutionStatus::Success => status.successful.push(future_id),
            ExecutionStatus::Timeout => status.timed_out.push(future_id),
            ExecutionStatus::Held => {
                let (held_id, reason) = held_details(execution_state).unwrap_or_default();
                status.held.push(HeldFuture {
                    future_id,
                    held_id,
                    reason,
                });
            }
            ExecutionStatus::Failed => status.failed.push(FailedFuture {
                message: execution_state
                    .failure_message()
                    .unwrap_or_else(|| "failed".to_string()),
                future_id,
            }),
        }
    }
    status
}

fn held_details(execution_state: &ExecutionState) -> Option<(u64, String)> {
    fn from_result<S>(result: Option<&ExecutionResult<S>>) -> Option<(u64, String)> {
        match result? {
            ExecutionResult::StrategyHeld { held_id, reason } => Some((*held_id, reason.clone())),
            _ => None,
        }
    }

    match execution_state {
        ExecutionState::Deployment(state) => from_result(state.result.as_ref()),
        ExecutionState::Call(state) => from_result(state.result.as_ref()),
        ExecutionState::StaticCall(state) => from_result(state.result.as_ref()),
        ExecutionState::SendData(state) => from_result(state.result.as_ref()),
        ExecutionState::EncodeFunctionCall(_) | ExecutionState::ContractAt(_) | ExecutionState::ReadEventArgument(_) => {
            None
        }
    }
}

fn find_network_interaction<'a>(
    state: &'a DeploymentState,
    future_id: &str,
    network_interaction_id: u32,
) -> Option<&'a NetworkInteraction> {
    state
        .execution_state(future_id)?
        .network_interactions()?
        .iter()
        .find(|interaction| interaction.id() == network_interaction_id)
}

pub fn find_onchain_interaction_by<'a>(
    state: &'a DeploymentState,
    future_id: &str,
    network_interaction_id: u32,
) -> Option<&'a OnchainInteraction> {
    match find_network_interaction(state, future_id, network_interaction_id)? {
        NetworkInteraction::Onchain(interaction) => Some(interaction),
        NetworkInteraction::StaticCall(_) => None,
    }
}

pub fn find_static_call_by<'a>(
    state: &'a DeploymentState,
    future_id: &str,
    network_interaction_id: u32,
) -> Option<&'a StaticCallInteraction> {
    match find_network_interaction(state, future_id, network_interaction_id)? {
        NetworkInteraction::StaticCall(interaction) => Some(interaction),
        NetworkInteraction::Onchain(_) => None,
    }
}

pub fn find_transaction_by<'a>(
    state: &'a DeploymentState,
    future_id: &str,
    network_interaction_id: u32,
    hash: &str,
) -> Option<&'a Transaction> {
    find_onchain_interaction_by(state, future_id, network_interaction_id)?
        .transactions
        .iter()
        .find(|transaction| transaction.hash == hash)
}

#[cfg(test)]
#[path = "views_test.rs"]
mod tests;
