use std::collections::BTreeSet;

use futures::stream::{self, StreamExt};
use ignis_core::{
    module_parameters, AccountRef, DeploymentInitializeMessage, DeploymentModule, DeploymentParameters,
    DeploymentState, ExecutionStatus, JournalMessage,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::future_processor::{FutureProcessor, FutureProgress};
use super::nonce::{synchronize_nonces, NonceManager};
use super::session::ExecutionSession;
use super::validation::validate_module;
use super::{DeploymentResult, EngineError, EngineOptions};
use crate::batcher::batch_futures;
use crate::chain::ChainClient;
use crate::events::{ExecutionEvent, ExecutionEventListener, ExecutionEventType};
use crate::journal::{load_deployment_state, Journal};
use crate::reconciliation::{reconcile, ReconciliationContext};
use crate::strategy::{AbiCodec, ArtifactResolver, ExecutionStrategy};
use crate::views::find_status;

/// Runs deployment modules against one chain. Everything the engine does is
/// recorded in the journal passed to [`ExecutionEngine::deploy`], so a run
/// that stops for any reason can be resumed by deploying again.
pub struct ExecutionEngine<'a> {
    chain: &'a dyn ChainClient,
    strategy: &'a dyn ExecutionStrategy,
    artifacts: &'a dyn ArtifactResolver,
    codec: &'a dyn AbiCodec,
    options: EngineOptions,
    parameters: DeploymentParameters,
    listener: Option<&'a mut dyn ExecutionEventListener>,
    run_id: String,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        strategy: &'a dyn ExecutionStrategy,
        artifacts: &'a dyn ArtifactResolver,
        codec: &'a dyn AbiCodec,
    ) -> Self {
        Self {
            chain,
            strategy,
            artifacts,
            codec,
            options: EngineOptions::default(),
            parameters: DeploymentParameters::new(),
            listener: None,
            run_id: "run".to_string(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Values for `{"parameter": name}` placeholders, keyed by module id.
    pub fn with_parameters(mut self, parameters: DeploymentParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_listener(mut self, listener: &'a mut dyn ExecutionEventListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub async fn deploy(
        &mut self,
        module: &DeploymentModule,
        journal: &mut dyn Journal,
    ) -> Result<DeploymentResult, EngineError> {
        let chain_id = self.chain.chain_id().await?;
        let accounts = self.chain.accounts().await?;
        let default_sender = match &self.options.default_sender {
            Some(sender) => sender.clone(),
            None => accounts.first().cloned().ok_or(EngineError::NoAccounts)?,
        };

        let stored = load_deployment_state(journal)?.unwrap_or_default();
        if stored.is_initialized() && stored.chain_id != chain_id {
            return Err(EngineError::ChainIdMismatch {
                journal: stored.chain_id,
                chain: chain_id,
            });
        }

        let listener = self
            .listener
            .as_mut()
            .map(|listener| &mut **listener as &mut dyn ExecutionEventListener);
        let session = ExecutionSession::new(journal, stored, &self.run_id, listener);
        session.emit(
            ExecutionEvent::new(ExecutionEventType::RunStart)
                .with_data("module_id", json!(module.id))
                .with_data("chain_id", json!(chain_id)),
        );
        session.emit(ExecutionEvent::new(ExecutionEventType::SetModuleId).with_data("module_id", json!(module.id)));
        session.emit(
            ExecutionEvent::new(ExecutionEventType::SetStrategy).with_data("strategy", json!(self.strategy.name())),
        );

        let parameters = module_parameters(&self.parameters, &module.id);
        let state = session.state();
        let issues = validate_module(module, &state, &accounts, &parameters, self.artifacts, self.codec);
        if !issues.is_empty() {
            warn!(module_id = %module.id, issues = issues.len(), "module is invalid");
            return Ok(complete(&session, DeploymentResult::ValidationError { issues }));
        }

        let strategy_config = self.strategy.config();
        let reconciliation = reconcile(&ReconciliationContext {
            module,
            state: &state,
            accounts: &accounts,
            default_sender: &default_sender,
            strategy: self.strategy.name(),
            strategy_config: &strategy_config,
            parameters: &parameters,
        });
        let warnings = reconciliation.warnings();
        if !warnings.is_empty() {
            for warning in &warnings {
                warn!(module_id = %module.id, "{warning}");
            }
            session.emit(
                ExecutionEvent::new(ExecutionEventType::ReconciliationWarnings).with_data("warnings", json!(warnings)),
            );
        }
        if !reconciliation.is_compatible() {
            return Ok(complete(
                &session,
                DeploymentResult::ReconciliationError {
                    failures: reconciliation.failures,
                    warnings,
                },
            ));
        }

        if !state.is_initialized() {
            session.record(JournalMessage::DeploymentInitialize(DeploymentInitializeMessage { chain_id }))?;
        }
        session.emit(
            ExecutionEvent::new(ExecutionEventType::DeploymentStart)
                .with_data("module_id", json!(module.id))
                .with_data("is_resume", json!(!state.execution_states.is_empty())),
        );

        let senders = senders_of(module, &state, &accounts, &default_sender);
        for message in synchronize_nonces(self.chain, &state, &senders).await? {
            session.record(message)?;
        }

        let state = session.state();
        let batches = batch_futures(module, &state)?;
        info!(module_id = %module.id, batches = batches.len(), "deploying");
        session.emit(ExecutionEvent::new(ExecutionEventType::BatchInitialize).with_data("batches", json!(batches)));

        let nonces = NonceManager::new(self.chain, &state);
        let processor = FutureProcessor {
            module,
            parameters: &parameters,
            accounts: &accounts,
            default_sender: &default_sender,
            chain: self.chain,
            strategy: self.strategy,
            artifacts: self.artifacts,
            codec: self.codec,
            options: &self.options,
            session: &session,
            nonces: &nonces,
        };

        for (index, batch) in batches.iter().enumerate() {
            session.emit(
                ExecutionEvent::new(ExecutionEventType::BeginNextBatch)
                    .with_data("index", json!(index))
                    .with_data("futures", json!(batch)),
            );
            run_batch(&processor, batch).await?;

            let state = session.state();
            let unsuccessful = batch.iter().any(|future_id| {
                state
                    .execution_state(future_id)
                    .map_or(true, |execution_state| execution_state.status() != ExecutionStatus::Success)
            });
            if unsuccessful {
                warn!(module_id = %module.id, batch = index, "stopping after a batch with unsuccessful futures");
                break;
            }
        }

        let result = deployment_result(module, &session.state());
        Ok(complete(&session, result))
    }
}

/// Processes the batch until every member is terminal for this run,
/// waiting for a new block whenever some are still in flight.
async fn run_batch(processor: &FutureProcessor<'_, '_>, batch: &[String]) -> Result<(), EngineError> {
    let concurrency = processor.options.max_concurrency.max(1);
    loop {
        let unfinished: Vec<_> = batch
            .iter()
            .filter_map(|future_id| processor.module.future(future_id))
            .filter(|future| {
                processor
                    .session
                    .execution_state(&future.id)
                    .map_or(true, |execution_state| !execution_state.status().is_terminal())
            })
            .collect();
        if unfinished.is_empty() {
            return Ok(());
        }

        let progress: Vec<Result<FutureProgress, EngineError>> = stream::iter(unfinished)
            .map(|future| processor.process_future(future))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut waiting = false;
        for outcome in progress {
            waiting |= outcome? == FutureProgress::Waiting;
        }
        if waiting {
            processor.chain.wait_for_next_block().await?;
        }
    }
}

fn complete(session: &ExecutionSession<'_>, result: DeploymentResult) -> DeploymentResult {
    session.emit(
        ExecutionEvent::new(ExecutionEventType::DeploymentComplete)
            .with_data("result", serde_json::to_value(&result).unwrap_or(Value::Null)),
    );
    result
}

fn deployment_result(module: &DeploymentModule, state: &DeploymentState) -> DeploymentResult {
    let status = find_status(state);
    let all_succeeded = module.futures.iter().all(|future| {
        state
            .execution_state(&future.id)
            .is_some_and(|execution_state| execution_state.status() == ExecutionStatus::Success)
    });
    if all_succeeded {
        return DeploymentResult::Success {
            contracts: status.contracts,
        };
    }
    DeploymentResult::ExecutionError {
        started: status.started,
        timed_out: status.timed_out,
        held: status.held,
        failed: status.failed,
        successful: status.successful,
    }
}

/// Every address the module may send from, plus the senders of interactions
/// left in flight by a previous run.
fn senders_of(
    module: &DeploymentModule,
    state: &DeploymentState,
    accounts: &[String],
    default_sender: &str,
) -> BTreeSet<String> {
    let mut senders = BTreeSet::from([default_sender.to_string()]);
    for future in &module.futures {
        match future.kind.from_account() {
            Some(AccountRef::Account { account }) => senders.extend(accounts.get(*account).cloned()),
            Some(AccountRef::Address(address)) => {
                senders.insert(address.clone());
            }
            None => {}
        }
    }
    for index in module.referenced_accounts() {
        senders.extend(accounts.get(index).cloned());
    }
    senders.extend(
        state
            .execution_states
            .values()
            .filter(|execution_state| execution_state.status() == ExecutionStatus::Started)
            .filter_map(|execution_state| execution_state.from().map(str::to_string)),
    );
    senders
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
