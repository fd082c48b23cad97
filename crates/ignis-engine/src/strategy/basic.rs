use futures::future::{FutureExt, LocalBoxFuture};
use ignis_core::{
    DeploymentSuccess, ExecutionResult, ExecutionState, NetworkInteraction, NetworkInteractionRequest, StaticCallSuccess,
    TransactionReceiptStatus, TransactionSuccess,
};

use super::{AbiCodec, ArtifactResolver, ExecutionStrategy, StrategyError, StrategyOutcome, StrategyStep};

pub const BASIC_STRATEGY_NAME: &str = "basic";

/// One transaction (or static call) per future, sent from the future's
/// sender with plain `CREATE` for deployments.
pub struct BasicStrategy<'a> {
    artifacts: &'a dyn ArtifactResolver,
    codec: &'a dyn AbiCodec,
}

impl<'a> BasicStrategy<'a> {
    pub fn new(artifacts: &'a dyn ArtifactResolver, codec: &'a dyn AbiCodec) -> Self {
        Self { artifacts, codec }
    }

    fn step(&self, state: &ExecutionState) -> Result<StrategyStep, StrategyError> {
        let interactions = state.network_interactions().unwrap_or_default();
        match (state, interactions.last()) {
            (ExecutionState::Deployment(deployment), None) => {
                let artifact = self.artifacts.load_artifact(&deployment.artifact_id)?;
                let data = self
                    .codec
                    .encode_deployment(&artifact, &deployment.constructor_args, &deployment.libraries)?;
                Ok(StrategyStep::Request(NetworkInteractionRequest::Onchain {
                    id: 1,
                    to: None,
                    data,
                    value: deployment.value,
                    from: deployment.from.clone(),
                }))
            }
            (ExecutionState::Call(call), None) => {
                let artifact = self.artifacts.load_artifact(&call.artifact_id)?;
                let data = self
                    .codec
                    .encode_function_call(&artifact, &call.function_name, &call.args)?;
                Ok(StrategyStep::Request(NetworkInteractionRequest::Onchain {
                    id: 1,
                    to: Some(call.contract_address.clone()),
                    data,
                    value: call.value,
                    from: call.from.clone(),
                }))
            }
            (ExecutionState::SendData(send), None) => Ok(StrategyStep::Request(NetworkInteractionRequest::Onchain {
                id: 1,
                to: Some(send.to.clone()),
                data: send.data.clone(),
                value: send.value,
                from: send.from.clone(),
            })),
            (ExecutionState::StaticCall(call), None) => {
                let artifact = self.artifacts.load_artifact(&call.artifact_id)?;
                let data = self
                    .codec
                    .encode_function_call(&artifact, &call.function_name, &call.args)?;
                Ok(StrategyStep::Request(NetworkInteractionRequest::StaticCall {
                    id: 1,
                    to: Some(call.contract_address.clone()),
                    data,
                    from: call.from.clone(),
                }))
            }
            (ExecutionState::StaticCall(call), Some(NetworkInteraction::StaticCall(interaction))) => {
                let Some(result) = &interaction.result else {
                    return Err(unexpected(state, "static call has no result yet"));
                };
                let artifact = self.artifacts.load_artifact(&call.artifact_id)?;
                let outcome = if result.success {
                    let value = self.codec.decode_function_result(
                        &artifact,
                        &call.function_name,
                        &result.return_data,
                        &call.name_or_index,
                    )?;
                    ExecutionResult::Success(StaticCallSuccess { value })
                } else {
                    ExecutionResult::StaticCallError {
                        error: self.codec.decode_error(Some(&artifact), &result.return_data),
                    }
                };
                Ok(StrategyStep::Complete(StrategyOutcome::StaticCall(outcome)))
            }
            (_, Some(NetworkInteraction::Onchain(interaction))) => {
                let Some(transaction) = interaction.confirmed_transaction() else {
                    return Err(unexpected(state, "onchain interaction is not confirmed yet"));
                };
                let Some(receipt) = &transaction.receipt else {
                    return Err(unexpected(state, "confirmed transaction has no receipt"));
                };
                let tx_hash = transaction.hash.clone();
                let reverted = receipt.status == TransactionReceiptStatus::Failure;
                let outcome = match state {
                    ExecutionState::Deployment(_) if reverted => {
                        StrategyOutcome::Deployment(ExecutionResult::RevertedTransaction { tx_hash })
                    }
                    ExecutionState::Deployment(_) => match &receipt.contract_address {
                        Some(address) => StrategyOutcome::Deployment(ExecutionResult::Success(DeploymentSuccess {
                            address: address.clone(),
                        })),
                        None => StrategyOutcome::Deployment(ExecutionResult::StrategyError {
                            error: format!("deployment transaction {tx_hash} did not create a contract"),
                        }),
                    },
                    ExecutionState::Call(_) if reverted => {
                        StrategyOutcome::Call(ExecutionResult::RevertedTransaction { tx_hash })
                    }
                    ExecutionState::Call(_) => StrategyOutcome::Call(ExecutionResult::Success(TransactionSuccess { tx_hash })),
                    ExecutionState::SendData(_) if reverted => {
                        StrategyOutcome::SendData(ExecutionResult::RevertedTransaction { tx_hash })
                    }
                    ExecutionState::SendData(_) => {
                        StrategyOutcome::SendData(ExecutionResult::Success(TransactionSuccess { tx_hash }))
                    }
                    _ => return Err(unexpected(state, "unexpected onchain interaction")),
                };
                Ok(StrategyStep::Complete(outcome))
            }
            _ => Err(unexpected(state, "no strategy step for this state")),
        }
    }
}

fn unexpected(state: &ExecutionState, message: &str) -> StrategyError {
    StrategyError::UnexpectedState {
        kind: state.kind_name(),
        future_id: state.id().to_string(),
        message: message.to_string(),
    }
}

impl ExecutionStrategy for BasicStrategy<'_> {
    fn name(&self) -> &str {
        BASIC_STRATEGY_NAME
    }

    fn next_step<'a>(&'a self, state: &'a ExecutionState) -> LocalBoxFuture<'a, Result<StrategyStep, StrategyError>> {
        async move { self.step(state) }.boxed_local()
    }
}

#[cfg(test)]
#[path = "basic_test.rs"]
mod tests;
