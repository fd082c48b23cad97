use ignis_core::{
    CallExecutionStateInitializeMessage, ContractAtExecutionStateInitializeMessage, DeploymentExecutionStateInitializeMessage,
    DeploymentState, EncodeFunctionCallExecutionStateInitializeMessage, ExecutionState, Future, FutureKind, FutureType,
    JournalMessage, NetworkInteraction, ReadEventArgumentExecutionStateInitializeMessage,
    SendDataExecutionStateInitializeMessage, StaticCallExecutionStateInitializeMessage,
};

use super::future_processor::FutureProcessor;
use super::EngineError;
use crate::resolve::ResolutionContext;

impl FutureProcessor<'_, '_> {
    /// `*_EXECUTION_STATE_INITIALIZE` for a future that has no state yet,
    /// with every reference resolved against the results recorded so far.
    pub(super) fn initialize_message(&self, future: &Future) -> Result<JournalMessage, EngineError> {
        let state = self.session.state();
        let resolution =
            ResolutionContext::new(self.module, &state, self.accounts, self.default_sender).with_parameters(self.parameters);
        let future_id = future.id.clone();
        let strategy = self.strategy.name().to_string();
        let strategy_config = self.strategy.config();
        let dependencies = future.dependencies.clone();
        let artifact_id = || future.artifact_id().unwrap_or_default().to_string();

        let message = match &future.kind {
            FutureKind::ContractDeployment {
                contract_name,
                args,
                libraries,
                value,
                from,
                ..
            } => JournalMessage::DeploymentExecutionStateInitialize(DeploymentExecutionStateInitializeMessage {
                future_id,
                future_type: FutureType::ContractDeployment,
                strategy,
                strategy_config,
                dependencies,
                artifact_id: artifact_id(),
                contract_name: contract_name.clone(),
                constructor_args: resolution.values(args).map_err(failed(&future.id))?,
                libraries: resolution.libraries(libraries).map_err(failed(&future.id))?,
                value: resolution.amount(value.as_ref()).map_err(failed(&future.id))?,
                from: resolution.sender(from.as_ref()).map_err(failed(&future.id))?,
            }),
            FutureKind::LibraryDeployment {
                library_name,
                libraries,
                from,
                ..
            } => JournalMessage::DeploymentExecutionStateInitialize(DeploymentExecutionStateInitializeMessage {
                future_id,
                future_type: FutureType::LibraryDeployment,
                strategy,
                strategy_config,
                dependencies,
                artifact_id: artifact_id(),
                contract_name: library_name.clone(),
                constructor_args: Vec::new(),
                libraries: resolution.libraries(libraries).map_err(failed(&future.id))?,
                value: 0,
                from: resolution.sender(from.as_ref()).map_err(failed(&future.id))?,
            }),
            FutureKind::ContractAt {
                contract_name, address, ..
            } => JournalMessage::ContractAtExecutionStateInitialize(ContractAtExecutionStateInitializeMessage {
                future_id,
                strategy,
                strategy_config,
                dependencies,
                artifact_id: artifact_id(),
                contract_name: contract_name.clone(),
                contract_address: resolution.address(address).map_err(failed(&future.id))?,
            }),
            FutureKind::ContractCall {
                contract,
                function_name,
                args,
                value,
                from,
            } => JournalMessage::CallExecutionStateInitialize(CallExecutionStateInitializeMessage {
                future_id,
                strategy,
                strategy_config,
                dependencies,
                artifact_id: resolution.artifact_of(contract).map_err(failed(&future.id))?,
                contract_address: resolution
                    .contract_address(contract)
                    .map_err(failed(&future.id))?,
                function_name: function_name.clone(),
                args: resolution.values(args).map_err(failed(&future.id))?,
                value: resolution.amount(value.as_ref()).map_err(failed(&future.id))?,
                from: resolution.sender(from.as_ref()).map_err(failed(&future.id))?,
            }),
            FutureKind::StaticCall {
                contract,
                function_name,
                args,
                name_or_index,
                from,
            } => JournalMessage::StaticCallExecutionStateInitialize(StaticCallExecutionStateInitializeMessage {
                future_id,
                strategy,
                strategy_config,
                dependencies,
                artifact_id: resolution.artifact_of(contract).map_err(failed(&future.id))?,
                contract_address: resolution
                    .contract_address(contract)
                    .map_err(failed(&future.id))?,
                function_name: function_name.clone(),
                args: resolution.values(args).map_err(failed(&future.id))?,
                name_or_index: name_or_index.clone(),
                from: resolution.sender(from.as_ref()).map_err(failed(&future.id))?,
            }),
            FutureKind::EncodeFunctionCall {
                contract,
                function_name,
                args,
            } => {
                let artifact_id = resolution.artifact_of(contract).map_err(failed(&future.id))?;
                let args = resolution.values(args).map_err(failed(&future.id))?;
                let artifact = self
                    .artifacts
                    .load_artifact(&artifact_id)
                    .map_err(failed(&future.id))?;
                let result = self
                    .codec
                    .encode_function_call(&artifact, function_name, &args)
                    .map_err(failed(&future.id))?;
                JournalMessage::EncodeFunctionCallExecutionStateInitialize(EncodeFunctionCallExecutionStateInitializeMessage {
                    future_id,
                    strategy,
                    strategy_config,
                    dependencies,
                    artifact_id,
                    function_name: function_name.clone(),
                    args,
                    result,
                })
            }
            FutureKind::ReadEventArgument {
                future: source,
                event_name,
                name_or_index,
                event_index,
                emitter,
            } => {
                let emitter = emitter.as_deref().unwrap_or(source);
                let artifact_id = resolution.artifact_of(emitter).map_err(failed(&future.id))?;
                let emitter_address = resolution
                    .contract_address(emitter)
                    .map_err(failed(&future.id))?;
                let (tx_to_read_from, logs) = confirmed_logs(&state, source).ok_or_else(|| EngineError::Initialize {
                    future_id: future.id.clone(),
                    message: format!("{source} has no confirmed transaction to read events from"),
                })?;
                let artifact = self
                    .artifacts
                    .load_artifact(&artifact_id)
                    .map_err(failed(&future.id))?;
                let result = self
                    .codec
                    .decode_event_argument(&artifact, event_name, *event_index, name_or_index, &emitter_address, &logs)
                    .map_err(failed(&future.id))?;
                JournalMessage::ReadEventArgumentExecutionStateInitialize(ReadEventArgumentExecutionStateInitializeMessage {
                    future_id,
                    strategy,
                    strategy_config,
                    dependencies,
                    artifact_id,
                    event_name: event_name.clone(),
                    name_or_index: name_or_index.clone(),
                    tx_to_read_from,
                    emitter_address,
                    event_index: *event_index,
                    result,
                })
            }
            FutureKind::SendData { to, data, value, from } => {
                JournalMessage::SendDataExecutionStateInitialize(SendDataExecutionStateInitializeMessage {
                    future_id,
                    strategy,
                    strategy_config,
                    dependencies,
                    to: resolution.address(to).map_err(failed(&future.id))?,
                    data: data.clone().unwrap_or_else(|| "0x".to_string()),
                    value: resolution.amount(value.as_ref()).map_err(failed(&future.id))?,
                    from: resolution.sender(from.as_ref()).map_err(failed(&future.id))?,
                })
            }
        };
        Ok(message)
    }
}

fn failed<E: std::fmt::Display>(future_id: &str) -> impl Fn(E) -> EngineError + '_ {
    move |error| EngineError::Initialize {
        future_id: future_id.to_string(),
        message: error.to_string(),
    }
}

/// Hash and logs of the confirmed transaction of `future_id`'s last onchain
/// interaction.
fn confirmed_logs(state: &DeploymentState, future_id: &str) -> Option<(String, Vec<ignis_core::TransactionLog>)> {
    let execution_state: &ExecutionState = state.execution_state(future_id)?;
    let transaction = execution_state
        .network_interactions()?
        .iter()
        .rev()
        .find_map(|interaction| match interaction {
            NetworkInteraction::Onchain(onchain) => onchain.confirmed_transaction(),
            NetworkInteraction::StaticCall(_) => None,
        })?;
    let receipt = transaction.receipt.as_ref()?;
    Some((transaction.hash.clone(), receipt.logs.clone()))
}
