use std::sync::Arc;

use ignis_core::{
    CallExecutionState, ContractAtExecutionState, DeploymentExecutionState, DeploymentState,
    EncodeFunctionCallExecutionState, ExecutionState, ExecutionStateBase, ExecutionStatus, FutureType, JournalMessage,
    ReadEventArgumentExecutionState, SendDataExecutionState, StaticCallExecutionState,
};

use super::network_interaction;
use super::ReducerError;

pub(super) fn apply(state: &mut DeploymentState, message: &JournalMessage) -> Result<(), ReducerError> {
    let Some(future_id) = message.future_id() else {
        return Err(ReducerError::invariant(format!(
            "{} is not a future level message",
            message.message_type()
        )));
    };

    if let Some(initialized) = initialize_execution_state(message) {
        if state.execution_states.contains_key(future_id) {
            return Err(ReducerError::invariant(format!(
                "execution state for {future_id} is already initialized"
            )));
        }
        state
            .execution_states
            .insert(future_id.to_string(), Arc::new(initialized));
        return Ok(());
    }

    let execution_state = state
        .execution_state_mut(future_id)
        .ok_or_else(|| ReducerError::invariant(format!("no execution state for {future_id}")))?;

    match message {
        JournalMessage::DeploymentExecutionStateComplete(complete) => {
            let ExecutionState::Deployment(target) = execution_state else {
                return Err(kind_mismatch(execution_state, "DEPLOYMENT_EXECUTION_STATE"));
            };
            target.base.status = complete.result.status();
            target.result = Some(complete.result.clone());
        }
        JournalMessage::CallExecutionStateComplete(complete) => {
            let ExecutionState::Call(target) = execution_state else {
                return Err(kind_mismatch(execution_state, "CALL_EXECUTION_STATE"));
            };
            target.base.status = complete.result.status();
            target.result = Some(complete.result.clone());
        }
        JournalMessage::StaticCallExecutionStateComplete(complete) => {
            let ExecutionState::StaticCall(target) = execution_state else {
                return Err(kind_mismatch(execution_state, "STATIC_CALL_EXECUTION_STATE"));
            };
            target.base.status = complete.result.status();
            target.result = Some(complete.result.clone());
        }
        JournalMessage::SendDataExecutionStateComplete(complete) => {
            let ExecutionState::SendData(target) = execution_state else {
                return Err(kind_mismatch(execution_state, "SEND_DATA_EXECUTION_STATE"));
            };
            target.base.status = complete.result.status();
            target.result = Some(complete.result.clone());
        }
        JournalMessage::NetworkInteractionRequest(request) => {
            network_interaction::append_network_interaction(execution_state, &request.network_interaction)?;
        }
        JournalMessage::TransactionPrepareSend(prepare) => {
            network_interaction::apply_nonce(execution_state, prepare.network_interaction_id, prepare.nonce)?;
        }
        JournalMessage::TransactionSend(send) => {
            network_interaction::append_transaction(execution_state, send.network_interaction_id, &send.transaction)?;
        }
        JournalMessage::TransactionConfirm(confirm) => {
            network_interaction::confirm_transaction(
                execution_state,
                confirm.network_interaction_id,
                &confirm.hash,
                &confirm.receipt,
            )?;
        }
        JournalMessage::StaticCallComplete(complete) => {
            network_interaction::complete_static_call(execution_state, complete.network_interaction_id, &complete.result)?;
        }
        JournalMessage::OnchainInteractionBumpFees(signal) => {
            network_interaction::bump_fees(execution_state, signal.network_interaction_id)?;
        }
        JournalMessage::OnchainInteractionDropped(signal) => {
            network_interaction::resend_dropped(execution_state, signal.network_interaction_id)?;
        }
        JournalMessage::OnchainInteractionReplacedByUser(signal) => {
            network_interaction::reset_replaced_by_user(execution_state, signal.network_interaction_id)?;
        }
        JournalMessage::OnchainInteractionTimeout(signal) => {
            network_interaction::timeout(execution_state, signal.network_interaction_id)?;
        }
        other => {
            return Err(ReducerError::invariant(format!(
                "{} cannot be applied to execution state {future_id}",
                other.message_type()
            )));
        }
    }
    Ok(())
}

fn kind_mismatch(state: &ExecutionState, expected: &str) -> ReducerError {
    ReducerError::invariant(format!(
        "expected {expected} for {}, found {}",
        state.id(),
        state.kind_name()
    ))
}

fn base(
    id: &str,
    future_type: FutureType,
    strategy: &str,
    strategy_config: &ignis_core::StrategyConfig,
    dependencies: &std::collections::BTreeSet<String>,
    status: ExecutionStatus,
) -> ExecutionStateBase {
    ExecutionStateBase {
        id: id.to_string(),
        future_type,
        strategy: strategy.to_string(),
        strategy_config: strategy_config.clone(),
        status,
        dependencies: dependencies.clone(),
    }
}

/// Fresh execution state for an `*_EXECUTION_STATE_INITIALIZE` message.
/// Encode, contract-at and event reads are complete as soon as they exist.
pub fn initialize_execution_state(message: &JournalMessage) -> Option<ExecutionState> {
    let state = match message {
        JournalMessage::DeploymentExecutionStateInitialize(init) => ExecutionState::Deployment(DeploymentExecutionState {
            base: base(
                &init.future_id,
                init.future_type,
                &init.strategy,
                &init.strategy_config,
                &init.dependencies,
                ExecutionStatus::Started,
            ),
            artifact_id: init.artifact_id.clone(),
            contract_name: init.contract_name.clone(),
            constructor_args: init.constructor_args.clone(),
            libraries: init.libraries.clone(),
            value: init.value,
            from: init.from.clone(),
            network_interactions: Vec::new(),
            result: None,
        }),
        JournalMessage::CallExecutionStateInitialize(init) => ExecutionState::Call(CallExecutionState {
            base: base(
                &init.future_id,
                FutureType::ContractCall,
                &init.strategy,
                &init.strategy_config,
                &init.dependencies,
                ExecutionStatus::Started,
            ),
            artifact_id: init.artifact_id.clone(),
            contract_address: init.contract_address.clone(),
            function_name: init.function_name.clone(),
            args: init.args.clone(),
            value: init.value,
            from: init.from.clone(),
            network_interactions: Vec::new(),
            result: None,
        }),
        JournalMessage::StaticCallExecutionStateInitialize(init) => ExecutionState::StaticCall(StaticCallExecutionState {
            base: base(
                &init.future_id,
                FutureType::StaticCall,
                &init.strategy,
                &init.strategy_config,
                &init.dependencies,
                ExecutionStatus::Started,
            ),
            artifact_id: init.artifact_id.clone(),
            contract_address: init.contract_address.clone(),
            function_name: init.function_name.clone(),
            args: init.args.clone(),
            name_or_index: init.name_or_index.clone(),
            from: init.from.clone(),
            network_interactions: Vec::new(),
            result: None,
        }),
        JournalMessage::EncodeFunctionCallExecutionStateInitialize(init) => {
            ExecutionState::EncodeFunctionCall(EncodeFunctionCallExecutionState {
                base: base(
                    &init.future_id,
                    FutureType::EncodeFunctionCall,
                    &init.strategy,
                    &init.strategy_config,
                    &init.dependencies,
                    ExecutionStatus::Success,
                ),
                artifact_id: init.artifact_id.clone(),
                function_name: init.function_name.clone(),
                args: init.args.clone(),
                result: init.result.clone(),
            })
        }
        JournalMessage::ContractAtExecutionStateInitialize(init) => ExecutionState::ContractAt(ContractAtExecutionState {
            base: base(
                &init.future_id,
                FutureType::ContractAt,
                &init.strategy,
                &init.strategy_config,
                &init.dependencies,
                ExecutionStatus::Success,
            ),
            artifact_id: init.artifact_id.clone(),
            contract_name: init.contract_name.clone(),
            contract_address: init.contract_address.clone(),
        }),
        JournalMessage::ReadEventArgumentExecutionStateInitialize(init) => {
            ExecutionState::ReadEventArgument(ReadEventArgumentExecutionState {
                base: base(
                    &init.future_id,
                    FutureType::ReadEventArgument,
                    &init.strategy,
                    &init.strategy_config,
                    &init.dependencies,
                    ExecutionStatus::Success,
                ),
                artifact_id: init.artifact_id.clone(),
                event_name: init.event_name.clone(),
                name_or_index: init.name_or_index.clone(),
                tx_to_read_from: init.tx_to_read_from.clone(),
                emitter_address: init.emitter_address.clone(),
                event_index: init.event_index,
                result: init.result.clone(),
            })
        }
        JournalMessage::SendDataExecutionStateInitialize(init) => ExecutionState::SendData(SendDataExecutionState {
            base: base(
                &init.future_id,
                FutureType::SendData,
                &init.strategy,
                &init.strategy_config,
                &init.dependencies,
                ExecutionStatus::Started,
            ),
            to: init.to.clone(),
            data: init.data.clone(),
            value: init.value,
            from: init.from.clone(),
            network_interactions: Vec::new(),
            result: None,
        }),
        _ => return None,
    };
    Some(state)
}
