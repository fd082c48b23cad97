use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use futures::lock::Mutex;
use ignis_core::{DeploymentState, ExecutionStatus, JournalMessage, NetworkInteraction, OnchainInteractionMessage};
use tracing::{debug, info, warn};

use super::EngineError;
use crate::chain::{BlockTag, ChainClient, ChainError};

/// Hands out nonces per sender. Callers hold [`NonceManager::sender_lock`]
/// from nonce allocation until the transaction has been recorded.
pub(crate) struct NonceManager<'c> {
    chain: &'c dyn ChainClient,
    locks: RefCell<BTreeMap<String, Rc<Mutex<()>>>>,
    highest_used: RefCell<BTreeMap<String, u64>>,
}

impl<'c> NonceManager<'c> {
    pub(crate) fn new(chain: &'c dyn ChainClient, state: &DeploymentState) -> Self {
        let mut highest_used = BTreeMap::<String, u64>::new();
        for (sender, nonce) in recorded_nonces(state) {
            let entry = highest_used.entry(sender).or_insert(nonce);
            *entry = (*entry).max(nonce);
        }
        Self {
            chain,
            locks: RefCell::new(BTreeMap::new()),
            highest_used: RefCell::new(highest_used),
        }
    }

    pub(crate) fn sender_lock(&self, sender: &str) -> Rc<Mutex<()>> {
        self.locks
            .borrow_mut()
            .entry(sender.to_ascii_lowercase())
            .or_default()
            .clone()
    }

    /// The pending count, unless this run already used that nonce.
    pub(crate) async fn next_nonce(&self, sender: &str) -> Result<u64, ChainError> {
        let pending = self.chain.transaction_count(sender, BlockTag::Pending).await?;
        let local = self
            .highest_used
            .borrow()
            .get(&sender.to_ascii_lowercase())
            .map_or(0, |nonce| nonce + 1);
        let nonce = pending.max(local);
        debug!(sender, nonce, pending, "allocated nonce");
        Ok(nonce)
    }

    pub(crate) fn mark_used(&self, sender: &str, nonce: u64) {
        let mut highest_used = self.highest_used.borrow_mut();
        let entry = highest_used.entry(sender.to_ascii_lowercase()).or_insert(nonce);
        *entry = (*entry).max(nonce);
    }
}

fn recorded_nonces(state: &DeploymentState) -> impl Iterator<Item = (String, u64)> + '_ {
    state
        .execution_states
        .values()
        .filter_map(|execution_state| execution_state.network_interactions())
        .flatten()
        .filter_map(|interaction| match interaction {
            NetworkInteraction::Onchain(onchain) => onchain
                .nonce
                .map(|nonce| (onchain.from.to_ascii_lowercase(), nonce)),
            NetworkInteraction::StaticCall(_) => None,
        })
}

/// Unconfirmed interaction left behind by a previous run.
struct InFlight {
    future_id: String,
    network_interaction_id: u32,
    nonce: u64,
    hashes: Vec<String>,
}

fn in_flight_for(state: &DeploymentState, sender: &str) -> Vec<InFlight> {
    state
        .execution_states
        .values()
        .filter(|execution_state| execution_state.status() == ExecutionStatus::Started)
        .filter(|execution_state| {
            execution_state
                .from()
                .is_some_and(|from| from.eq_ignore_ascii_case(sender))
        })
        .filter_map(|execution_state| {
            let Some(NetworkInteraction::Onchain(interaction)) = execution_state.network_interactions()?.last() else {
                return None;
            };
            let nonce = interaction.nonce?;
            if interaction.confirmed_transaction().is_some() {
                return None;
            }
            Some(InFlight {
                future_id: execution_state.id().to_string(),
                network_interaction_id: interaction.id,
                nonce,
                hashes: interaction
                    .transactions
                    .iter()
                    .map(|transaction| transaction.hash.clone())
                    .collect(),
            })
        })
        .collect()
}

/// Brings interactions of a previous run in line with the chain before
/// anything new is sent: transactions that vanished while the engine was
/// not running are marked dropped, nonces taken by someone else are
/// released. Pending transactions the journal cannot explain stop the run.
pub(crate) async fn synchronize_nonces(
    chain: &dyn ChainClient,
    state: &DeploymentState,
    senders: &BTreeSet<String>,
) -> Result<Vec<JournalMessage>, EngineError> {
    let mut messages = Vec::new();
    for sender in senders {
        let latest = chain.transaction_count(sender, BlockTag::Latest).await?;
        let pending = chain.transaction_count(sender, BlockTag::Pending).await?;
        let in_flight = in_flight_for(state, sender);

        let mut explained = BTreeSet::new();
        for interaction in &in_flight {
            let signal = OnchainInteractionMessage {
                future_id: interaction.future_id.clone(),
                network_interaction_id: interaction.network_interaction_id,
            };
            let mut known = false;
            for hash in &interaction.hashes {
                if chain.transaction_exists(hash).await? {
                    known = true;
                    break;
                }
            }
            if known {
                explained.insert(interaction.nonce);
                continue;
            }
            if interaction.nonce < latest {
                warn!(
                    future_id = %interaction.future_id,
                    network_interaction_id = interaction.network_interaction_id,
                    nonce = interaction.nonce,
                    sender = %sender,
                    "nonce used by another transaction"
                );
                messages.push(JournalMessage::OnchainInteractionReplacedByUser(signal));
            } else if !interaction.hashes.is_empty() {
                info!(
                    future_id = %interaction.future_id,
                    network_interaction_id = interaction.network_interaction_id,
                    nonce = interaction.nonce,
                    "transaction dropped while not running, it will be sent again"
                );
                messages.push(JournalMessage::OnchainInteractionDropped(signal));
                explained.insert(interaction.nonce);
            } else {
                explained.insert(interaction.nonce);
            }
        }

        let unexplained = (latest..pending).any(|nonce| !explained.contains(&nonce));
        if unexplained {
            return Err(EngineError::WaitingForConfirmations { sender: sender.clone() });
        }
    }
    Ok(messages)
}

#[cfg(test)]
#[path = "nonce_test.rs"]
mod tests;
