use ignis_core::{JournalMessage, OnchainInteraction, OnchainInteractionMessage, TransactionConfirmMessage};
use tracing::{info, warn};

use super::future_processor::FutureProcessor;
use super::{DropPolicy, EngineError};
use crate::chain::BlockTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MonitorOutcome {
    /// A message was recorded, the future can move on.
    Recorded,
    Waiting,
}

impl FutureProcessor<'_, '_> {
    /// Checks an interaction with sent but unconfirmed transactions.
    pub(super) async fn monitor_onchain_interaction(
        &self,
        future_id: &str,
        interaction: &OnchainInteraction,
    ) -> Result<MonitorOutcome, EngineError> {
        let signal = OnchainInteractionMessage {
            future_id: future_id.to_string(),
            network_interaction_id: interaction.id,
        };

        for transaction in interaction.transactions.iter().rev() {
            let Some(receipt) = self.chain.transaction_receipt(&transaction.hash).await? else {
                continue;
            };
            let head = self.chain.latest_block().await?;
            let confirmations = (head.number + 1).saturating_sub(receipt.block_number);
            if confirmations < self.options.required_confirmations {
                return Ok(MonitorOutcome::Waiting);
            }
            info!(future_id, network_interaction_id = interaction.id, hash = %transaction.hash, "transaction confirmed");
            self.session
                .record(JournalMessage::TransactionConfirm(TransactionConfirmMessage {
                    future_id: future_id.to_string(),
                    network_interaction_id: interaction.id,
                    hash: transaction.hash.clone(),
                    receipt,
                }))?;
            return Ok(MonitorOutcome::Recorded);
        }

        let mut known = false;
        for transaction in &interaction.transactions {
            if self.chain.transaction_exists(&transaction.hash).await? {
                known = true;
                break;
            }
        }

        if !known {
            let nonce = interaction.nonce.unwrap_or_default();
            let latest = self.chain.transaction_count(&interaction.from, BlockTag::Latest).await?;
            let replaced = latest > nonce;
            warn!(
                future_id,
                network_interaction_id = interaction.id,
                nonce,
                replaced,
                "transaction is no longer known to the chain"
            );
            let message = match (self.options.drop_policy, replaced) {
                (DropPolicy::Halt, true) => {
                    return Err(EngineError::ReplacedByUser {
                        future_id: future_id.to_string(),
                        network_interaction_id: interaction.id,
                    })
                }
                (DropPolicy::Halt, false) => {
                    return Err(EngineError::DroppedTransaction {
                        future_id: future_id.to_string(),
                        network_interaction_id: interaction.id,
                    })
                }
                (DropPolicy::Resend, true) => JournalMessage::OnchainInteractionReplacedByUser(signal),
                (DropPolicy::Resend, false) => JournalMessage::OnchainInteractionDropped(signal),
            };
            self.session.record(message)?;
            return Ok(MonitorOutcome::Recorded);
        }

        let pending_since = self.session.pending_since(future_id, interaction.id);
        if pending_since.elapsed() < self.options.time_before_bumping_fees {
            return Ok(MonitorOutcome::Waiting);
        }

        let bumps = interaction.transactions.len().saturating_sub(1);
        let message = if bumps >= self.options.max_fee_bumps as usize {
            warn!(future_id, network_interaction_id = interaction.id, bumps, "giving up on transaction");
            JournalMessage::OnchainInteractionTimeout(signal)
        } else {
            info!(future_id, network_interaction_id = interaction.id, bumps, "bumping fees");
            JournalMessage::OnchainInteractionBumpFees(signal)
        };
        self.session.record(message)?;
        Ok(MonitorOutcome::Recorded)
    }
}
