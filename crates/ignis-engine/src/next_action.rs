use ignis_core::{ExecutionState, NetworkInteraction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextAction {
    RunStrategy,
    SendTransaction,
    QueryStaticCall,
    MonitorOnchainInteraction,
}

/// Decides the next step from the last network interaction alone.
pub fn next_action_for_network_interactions(interactions: &[NetworkInteraction]) -> NextAction {
    match interactions.last() {
        None => NextAction::RunStrategy,
        Some(NetworkInteraction::Onchain(interaction)) => {
            if interaction.transactions.is_empty() {
                NextAction::SendTransaction
            } else if interaction
                .transactions
                .iter()
                .any(|transaction| transaction.receipt.is_some())
            {
                NextAction::RunStrategy
            } else if interaction.should_be_resent {
                NextAction::SendTransaction
            } else {
                NextAction::MonitorOnchainInteraction
            }
        }
        Some(NetworkInteraction::StaticCall(interaction)) => match interaction.result {
            Some(_) => NextAction::RunStrategy,
            None => NextAction::QueryStaticCall,
        },
    }
}

/// `None` for kinds that complete when they are initialized.
pub fn next_action_for_execution_state(state: &ExecutionState) -> Option<NextAction> {
    state
        .network_interactions()
        .map(next_action_for_network_interactions)
}

#[cfg(test)]
#[path = "next_action_test.rs"]
mod tests;
