use ignis_core::{
    DeploymentModule, ExecutionState, Future, JournalMessage, ModuleParameters, NetworkInteraction,
    NetworkInteractionRequestMessage, OnchainInteraction, StaticCallCompleteMessage, StaticCallInteraction, Transaction, TransactionPrepareSendMessage,
    TransactionSendMessage,
};
use tracing::{debug, info, warn};

use super::monitor::MonitorOutcome;
use super::nonce::NonceManager;
use super::options::FEE_BUMP_PERCENT;
use super::session::ExecutionSession;
use super::{EngineError, EngineOptions};
use crate::chain::{BlockTag, CallParams, ChainClient, TransactionParams};
use crate::journal::JournalError;
use crate::next_action::{next_action_for_execution_state, NextAction};
use crate::reducer::ReducerError;
use crate::strategy::{
    AbiCodec, Artifact, ArtifactResolver, ExecutionFailure, ExecutionStrategy, StrategyOutcome, StrategyStep,
};

/// Where a future stands after one call to [`FutureProcessor::process_future`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FutureProgress {
    /// Terminal for this run (success, failure, timeout or held).
    Finished,
    /// Waiting on the chain, poll again after the next block.
    Waiting,
}

pub(crate) struct FutureProcessor<'p, 's> {
    pub(super) module: &'p DeploymentModule,
    pub(super) parameters: &'p ModuleParameters,
    pub(super) accounts: &'p [String],
    pub(super) default_sender: &'p str,
    pub(super) chain: &'p dyn ChainClient,
    pub(super) strategy: &'p dyn ExecutionStrategy,
    pub(super) artifacts: &'p dyn ArtifactResolver,
    pub(super) codec: &'p dyn AbiCodec,
    pub(super) options: &'p EngineOptions,
    pub(super) session: &'p ExecutionSession<'s>,
    pub(super) nonces: &'p NonceManager<'p>,
}

impl FutureProcessor<'_, '_> {
    /// Drives one future as far as it can go without waiting for a block.
    pub(crate) async fn process_future(&self, future: &Future) -> Result<FutureProgress, EngineError> {
        if self.session.execution_state(&future.id).is_none() {
            let message = self.initialize_message(future)?;
            info!(future_id = %future.id, "starting future");
            self.session.record(message)?;
        }

        loop {
            let Some(state) = self.session.execution_state(&future.id) else {
                return Ok(FutureProgress::Finished);
            };
            if state.status().is_terminal() {
                return Ok(FutureProgress::Finished);
            }
            let Some(action) = next_action_for_execution_state(&state) else {
                return Ok(FutureProgress::Finished);
            };
            debug!(future_id = %future.id, ?action, "next action");

            match action {
                NextAction::RunStrategy => self.run_strategy(&state).await?,
                NextAction::SendTransaction => {
                    let interaction = last_onchain_interaction(&state)?;
                    self.send_transaction(&state, interaction).await?;
                }
                NextAction::QueryStaticCall => {
                    let interaction = last_static_call(&state)?;
                    self.query_static_call(&future.id, interaction).await?;
                }
                NextAction::MonitorOnchainInteraction => {
                    let interaction = last_onchain_interaction(&state)?;
                    if self.monitor_onchain_interaction(&future.id, interaction).await? == MonitorOutcome::Waiting {
                        return Ok(FutureProgress::Waiting);
                    }
                }
            }
        }
    }

    async fn run_strategy(&self, state: &ExecutionState) -> Result<(), EngineError> {
        let future_id = state.id();
        let message = match self.strategy.next_step(state).await {
            Ok(StrategyStep::Request(request)) => JournalMessage::NetworkInteractionRequest(NetworkInteractionRequestMessage {
                future_id: future_id.to_string(),
                network_interaction: request,
            }),
            Ok(StrategyStep::Complete(outcome)) => outcome.into_message(future_id),
            Err(error) => {
                warn!(future_id, %error, "strategy failed");
                self.failure_message(state, ExecutionFailure::Strategy(error.to_string()))?
            }
        };
        self.session.record(message)
    }

    fn failure_message(&self, state: &ExecutionState, failure: ExecutionFailure) -> Result<JournalMessage, EngineError> {
        StrategyOutcome::failure(state, failure)
            .map(|outcome| outcome.into_message(state.id()))
            .ok_or_else(|| EngineError::Initialize {
                future_id: state.id().to_string(),
                message: format!("{} cannot fail after initialization", state.kind_name()),
            })
    }

    async fn send_transaction(&self, state: &ExecutionState, interaction: &OnchainInteraction) -> Result<(), EngineError> {
        let future_id = state.id();
        let lock = self.nonces.sender_lock(&interaction.from);
        let _guard = lock.lock().await;

        if interaction.transactions.is_empty() {
            let simulation = self
                .chain
                .static_call(
                    &CallParams {
                        from: interaction.from.clone(),
                        to: interaction.to.clone(),
                        data: interaction.data.clone(),
                        value: interaction.value,
                    },
                    BlockTag::Pending,
                )
                .await?;
            if !simulation.success {
                let artifact = self.artifact_for(state);
                let error = self.codec.decode_error(artifact.as_ref(), &simulation.return_data);
                warn!(future_id, network_interaction_id = interaction.id, %error, "simulation failed");
                let message = self.failure_message(state, ExecutionFailure::Simulation(error))?;
                return self.session.record(message);
            }
        }

        let nonce = match interaction.nonce {
            Some(nonce) => nonce,
            None => {
                let nonce = self.nonces.next_nonce(&interaction.from).await?;
                self.session
                    .record(JournalMessage::TransactionPrepareSend(TransactionPrepareSendMessage {
                        future_id: future_id.to_string(),
                        network_interaction_id: interaction.id,
                        nonce,
                    }))?;
                nonce
            }
        };

        let network_fees = self.chain.network_fees().await?;
        let fees = match interaction.transactions.last() {
            Some(previous) => network_fees.max(&previous.fees.bumped(FEE_BUMP_PERCENT)),
            None => network_fees,
        };

        let params = TransactionParams {
            from: interaction.from.clone(),
            to: interaction.to.clone(),
            data: interaction.data.clone(),
            value: interaction.value,
            nonce,
            fees: fees.clone(),
        };
        let hash = self.chain.send_transaction(&params).await?;
        info!(
            future_id,
            network_interaction_id = interaction.id,
            nonce,
            sender = %interaction.from,
            hash = %hash,
            "transaction sent"
        );
        self.nonces.mark_used(&interaction.from, nonce);
        self.session.record(JournalMessage::TransactionSend(TransactionSendMessage {
            future_id: future_id.to_string(),
            network_interaction_id: interaction.id,
            transaction: Transaction {
                hash,
                fees,
                nonce,
                receipt: None,
            },
        }))?;
        self.session.mark_sent(future_id, interaction.id);
        Ok(())
    }

    async fn query_static_call(&self, future_id: &str, interaction: &StaticCallInteraction) -> Result<(), EngineError> {
        let result = self
            .chain
            .static_call(
                &CallParams {
                    from: interaction.from.clone(),
                    to: interaction.to.clone(),
                    data: interaction.data.clone(),
                    value: 0,
                },
                BlockTag::Latest,
            )
            .await?;
        self.session.record(JournalMessage::StaticCallComplete(StaticCallCompleteMessage {
            future_id: future_id.to_string(),
            network_interaction_id: interaction.id,
            result,
        }))
    }

    fn artifact_for(&self, state: &ExecutionState) -> Option<Artifact> {
        let artifact_id = match state {
            ExecutionState::Deployment(deployment) => &deployment.artifact_id,
            ExecutionState::Call(call) => &call.artifact_id,
            ExecutionState::StaticCall(call) => &call.artifact_id,
            _ => return None,
        };
        self.artifacts.load_artifact(artifact_id).ok()
    }
}

fn last_onchain_interaction(state: &ExecutionState) -> Result<&OnchainInteraction, EngineError> {
    match state.network_interactions().and_then(<[NetworkInteraction]>::last) {
        Some(NetworkInteraction::Onchain(interaction)) => Ok(interaction),
        _ => Err(unexpected_interaction(state, "an onchain interaction")),
    }
}

fn last_static_call(state: &ExecutionState) -> Result<&StaticCallInteraction, EngineError> {
    match state.network_interactions().and_then(<[NetworkInteraction]>::last) {
        Some(NetworkInteraction::StaticCall(interaction)) => Ok(interaction),
        _ => Err(unexpected_interaction(state, "a static call")),
    }
}

fn unexpected_interaction(state: &ExecutionState, expected: &str) -> EngineError {
    EngineError::Journal(JournalError::Reducer(ReducerError::invariant(format!(
        "last network interaction of {} is not {expected}",
        state.id()
    ))))
}
