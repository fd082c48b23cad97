use ignis_core::{
    ExecutionState, ExecutionStatus, NetworkInteraction, NetworkInteractionRequest, OnchainInteraction,
    RawStaticCallResult, StaticCallInteraction, Transaction, TransactionReceipt,
};

use super::ReducerError;

pub(super) fn append_network_interaction(
    state: &mut ExecutionState,
    request: &NetworkInteractionRequest,
) -> Result<(), ReducerError> {
    let id = state.id().to_string();
    if matches!(state, ExecutionState::StaticCall(_)) && !matches!(request, NetworkInteractionRequest::StaticCall { .. }) {
        return Err(ReducerError::invariant(format!(
            "static call execution state {id} can only hold static call interactions"
        )));
    }
    let kind_name = state.kind_name();
    let Some(interactions) = state.network_interactions_mut() else {
        return Err(ReducerError::invariant(format!(
            "{kind_name} {id} does not have network interactions"
        )));
    };
    let expected = interactions.last().map_or(1, |last| last.id() + 1);
    if request.id() != expected {
        return Err(ReducerError::invariant(format!(
            "network interaction {id}/{} is out of sequence, expected id {expected}",
            request.id()
        )));
    }
    interactions.push(request.clone().into_interaction());
    Ok(())
}

pub(super) fn apply_nonce(state: &mut ExecutionState, interaction_id: u32, nonce: u64) -> Result<(), ReducerError> {
    let future_id = state.id().to_string();
    let interaction = onchain_interaction_mut(state, interaction_id)?;
    match interaction.nonce {
        Some(existing) if existing != nonce => Err(ReducerError::invariant(format!(
            "Transaction prepared for {future_id}/{interaction_id} with nonce {nonce} but expected {existing}"
        ))),
        _ => {
            interaction.nonce = Some(nonce);
            Ok(())
        }
    }
}

pub(super) fn append_transaction(
    state: &mut ExecutionState,
    interaction_id: u32,
    transaction: &Transaction,
) -> Result<(), ReducerError> {
    let future_id = state.id().to_string();
    let interaction = onchain_interaction_mut(state, interaction_id)?;
    if let Some(existing) = interaction.nonce {
        if existing != transaction.nonce {
            return Err(ReducerError::invariant(format!(
                "New transaction sent for {future_id}/{interaction_id} with nonce {} but expected {existing}",
                transaction.nonce
            )));
        }
    }
    interaction.nonce = Some(transaction.nonce);
    interaction.should_be_resent = false;
    let mut transaction = transaction.clone();
    transaction.receipt = None;
    interaction.transactions.push(transaction);
    Ok(())
}

/// Attaches the receipt and drops every other attempt for the interaction.
pub(super) fn confirm_transaction(
    state: &mut ExecutionState,
    interaction_id: u32,
    hash: &str,
    receipt: &TransactionReceipt,
) -> Result<(), ReducerError> {
    let future_id = state.id().to_string();
    let interaction = onchain_interaction_mut(state, interaction_id)?;
    let Some(position) = interaction
        .transactions
        .iter()
        .position(|transaction| transaction.hash == hash)
    else {
        return Err(ReducerError::invariant(format!(
            "unknown transaction {hash} confirmed for {future_id}/{interaction_id}"
        )));
    };
    let mut confirmed = interaction.transactions.swap_remove(position);
    confirmed.receipt = Some(receipt.clone());
    interaction.transactions = vec![confirmed];
    Ok(())
}

pub(super) fn complete_static_call(
    state: &mut ExecutionState,
    interaction_id: u32,
    result: &RawStaticCallResult,
) -> Result<(), ReducerError> {
    let interaction = static_call_mut(state, interaction_id)?;
    interaction.result = Some(result.clone());
    Ok(())
}

pub(super) fn bump_fees(state: &mut ExecutionState, interaction_id: u32) -> Result<(), ReducerError> {
    onchain_interaction_mut(state, interaction_id)?.should_be_resent = true;
    Ok(())
}

pub(super) fn resend_dropped(state: &mut ExecutionState, interaction_id: u32) -> Result<(), ReducerError> {
    onchain_interaction_mut(state, interaction_id)?.should_be_resent = true;
    Ok(())
}

/// The nonce was taken by a transaction we did not send. Start over.
pub(super) fn reset_replaced_by_user(state: &mut ExecutionState, interaction_id: u32) -> Result<(), ReducerError> {
    let interaction = onchain_interaction_mut(state, interaction_id)?;
    interaction.transactions.clear();
    interaction.nonce = None;
    interaction.should_be_resent = false;
    Ok(())
}

pub(super) fn timeout(state: &mut ExecutionState, interaction_id: u32) -> Result<(), ReducerError> {
    onchain_interaction_mut(state, interaction_id)?;
    state.base_mut().status = ExecutionStatus::Timeout;
    Ok(())
}

fn find_interaction_mut(state: &mut ExecutionState, interaction_id: u32) -> Result<&mut NetworkInteraction, ReducerError> {
    let future_id = state.id().to_string();
    let kind_name = state.kind_name();
    let Some(interactions) = state.network_interactions_mut() else {
        return Err(ReducerError::invariant(format!(
            "{kind_name} {future_id} does not have network interactions"
        )));
    };
    interactions
        .iter_mut()
        .find(|interaction| interaction.id() == interaction_id)
        .ok_or_else(|| ReducerError::invariant(format!("no network interaction {future_id}/{interaction_id}")))
}

fn onchain_interaction_mut(state: &mut ExecutionState, interaction_id: u32) -> Result<&mut OnchainInteraction, ReducerError> {
    let future_id = state.id().to_string();
    match find_interaction_mut(state, interaction_id)? {
        NetworkInteraction::Onchain(interaction) => Ok(interaction),
        NetworkInteraction::StaticCall(_) => Err(ReducerError::invariant(format!(
            "network interaction {future_id}/{interaction_id} is not an onchain interaction"
        ))),
    }
}

fn static_call_mut(state: &mut ExecutionState, interaction_id: u32) -> Result<&mut StaticCallInteraction, ReducerError> {
    let future_id = state.id().to_string();
    match find_interaction_mut(state, interaction_id)? {
        NetworkInteraction::StaticCall(interaction) => Ok(interaction),
        NetworkInteraction::Onchain(_) => Err(ReducerError::invariant(format!(
            "network interaction {future_id}/{interaction_id} is not a static call"
        ))),
    }
}
