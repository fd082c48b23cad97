use crate::cli::{BatchesCommand, DeployCommand, JournalCommand, OutputFormat, StatusCommand, WipeCommand};
use crate::config::{build_accounts, build_endpoint, engine_options, load_runner_config, RunnerConfigError};
use crate::io::{load_deployment_module, load_deployment_parameters, ModuleLoadError, ParametersLoadError};
use ignis_core::{DeploymentState, ExecutionState, StructuredIssue};
use ignis_engine::{
    batch_futures, find_status, load_deployment_state, wipe, BasicStrategy, BatchError, DeploymentResult,
    EngineError, ExecutionEngine, FileJournal, Journal, JournalError, JsonlEventWriter, StatusResult, WipeError,
};
use ignis_evm_client::{AlloyAbiCodec, AlloyChainClient, FsArtifactResolver, ProviderError};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Module(#[from] ModuleLoadError),
    #[error(transparent)]
    Parameters(#[from] ParametersLoadError),
    #[error(transparent)]
    Config(#[from] RunnerConfigError),
    #[error("journal `{path}` failed: {source}")]
    Journal {
        path: String,
        #[source]
        source: JournalError,
    },
    #[error("journal `{path}` has no recorded deployment")]
    EmptyJournal { path: String },
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Wipe(#[from] WipeError),
    #[error("connect failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("deployment stopped: {0}")]
    Engine(#[from] EngineError),
    #[error("open events file failed `{path}`: {source}")]
    EventsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("start async runtime failed: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("json encode failed: {0}")]
    JsonEncode(#[from] serde_json::Error),
}

pub fn execute_deploy(command: &DeployCommand) -> Result<String, RunnerError> {
    let module = load_deployment_module(&command.module)?;
    let parameters = match &command.parameters {
        Some(path) => load_deployment_parameters(path)?,
        None => Default::default(),
    };
    let config = load_runner_config(&command.config)?;
    let options = engine_options(&config);
    let endpoint = build_endpoint(&config)?;
    let accounts = build_accounts(&config)?;

    let artifacts = FsArtifactResolver::new(config.artifacts_dir.clone());
    let codec = AlloyAbiCodec;
    let strategy = BasicStrategy::new(&artifacts, &codec);
    let mut journal = FileJournal::new(&command.journal);
    let mut events = match &command.events_jsonl {
        Some(path) => Some(JsonlEventWriter::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| RunnerError::EventsIo {
                    path: path.display().to_string(),
                    source,
                })?,
        )),
        None => None,
    };

    info!(module_id = %module.id, journal = %command.journal.display(), rpc_url = %endpoint.rpc_url, "deploying");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RunnerError::Runtime)?;
    let result = runtime.block_on(async {
        let chain = AlloyChainClient::connect(endpoint, accounts).await?;
        let mut engine = ExecutionEngine::new(&chain, &strategy, &artifacts, &codec)
            .with_options(options)
            .with_parameters(parameters);
        if let Some(run_id) = &command.run_id {
            engine = engine.with_run_id(run_id.clone());
        }
        if let Some(writer) = events.as_mut() {
            engine = engine.with_listener(writer);
        }
        engine.deploy(&module, &mut journal).await.map_err(RunnerError::from)
    })?;

    render_deployment_result(&module.id, &result, &command.format)
}

pub fn execute_batches(command: &BatchesCommand) -> Result<String, RunnerError> {
    let module = load_deployment_module(&command.module)?;
    let state = match &command.journal {
        Some(path) => read_state(path)?.unwrap_or_default(),
        None => DeploymentState::default(),
    };
    let batches = batch_futures(&module, &state)?;

    let output = match command.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": "ignis-runner-batches/0.0.1",
            "module_id": module.id,
            "batches": batches,
        }))?,
        OutputFormat::Text => {
            let mut lines = vec![format!("Ignis batches\nmodule: {}", module.id)];
            if batches.is_empty() {
                lines.push("nothing left to execute".to_string());
            }
            for (index, batch) in batches.iter().enumerate() {
                lines.push(format!("batch {}: {}", index + 1, batch.join(", ")));
            }
            lines.join("\n")
        }
    };
    Ok(output)
}

pub fn execute_status(command: &StatusCommand) -> Result<String, RunnerError> {
    let state = require_state(&command.journal)?;
    let status = find_status(&state);
    match command.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "schema": "ignis-runner-status/0.0.1",
            "complete": status.is_complete(),
            "status": status,
        }))?),
        OutputFormat::Text => Ok(render_status_text(&status)),
    }
}

pub fn execute_wipe(command: &WipeCommand) -> Result<String, RunnerError> {
    let mut journal = FileJournal::new(&command.journal);
    let state = wipe(&mut journal, command.future.as_str())?;
    info!(future_id = %command.future, journal = %command.journal.display(), "wiped");
    match command.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "schema": "ignis-runner-wipe/0.0.1",
            "wiped": command.future,
            "remaining": state.execution_states.keys().collect::<Vec<_>>(),
        }))?),
        OutputFormat::Text => Ok(format!(
            "Ignis wipe\nwiped: {}\nremaining futures: {}",
            command.future,
            state.execution_states.len()
        )),
    }
}

pub fn execute_journal(command: &JournalCommand) -> Result<String, RunnerError> {
    let journal = FileJournal::new(&command.journal);
    let messages = journal.read_all().map_err(|source| journal_error(&command.journal, source))?;
    let state = require_state(&command.journal)?;
    match command.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "schema": "ignis-runner-journal/0.0.1",
            "messages": messages.len(),
            "state": state,
        }))?),
        OutputFormat::Text => {
            let mut lines = vec![
                "Ignis journal".to_string(),
                format!("chain_id: {}", state.chain_id),
                format!("messages: {}", messages.len()),
            ];
            for execution_state in state.execution_states.values() {
                lines.push(render_execution_state_line(execution_state));
            }
            Ok(lines.join("\n"))
        }
    }
}

fn read_state(path: &Path) -> Result<Option<DeploymentState>, RunnerError> {
    load_deployment_state(&FileJournal::new(path)).map_err(|source| journal_error(path, source))
}

fn require_state(path: &Path) -> Result<DeploymentState, RunnerError> {
    read_state(path)?.ok_or_else(|| RunnerError::EmptyJournal {
        path: path.display().to_string(),
    })
}

fn journal_error(path: &Path, source: JournalError) -> RunnerError {
    RunnerError::Journal {
        path: path.display().to_string(),
        source,
    }
}

fn render_execution_state_line(execution_state: &ExecutionState) -> String {
    let mut line = format!(
        "{} {} {:?}",
        execution_state.id(),
        execution_state.kind_name(),
        execution_state.status()
    );
    if let Some(interactions) = execution_state.network_interactions() {
        line.push_str(&format!(" interactions={}", interactions.len()));
    }
    if let Some(message) = execution_state.failure_message() {
        line.push_str(&format!(" ({message})"));
    }
    line
}

fn render_deployment_result(
    module_id: &str,
    result: &DeploymentResult,
    format: &OutputFormat,
) -> Result<String, RunnerError> {
    if *format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&json!({
            "schema": "ignis-runner-deploy/0.0.1",
            "module_id": module_id,
            "result": result,
        }))?);
    }

    let mut lines = vec!["Ignis deploy".to_string(), format!("module: {module_id}")];
    match result {
        DeploymentResult::Success { contracts } => {
            lines.push("result: success".to_string());
            for contract in contracts {
                lines.push(format!("  {} ({}): {}", contract.id, contract.contract_name, contract.address));
            }
        }
        DeploymentResult::ExecutionError {
            started,
            timed_out,
            held,
            failed,
            successful,
        } => {
            lines.push("result: execution error".to_string());
            lines.push(format!("successful: {}", successful.join(",")));
            push_list(&mut lines, "still running", started);
            push_list(&mut lines, "timed out", timed_out);
            for future in held {
                lines.push(format!("held: {} (#{}) {}", future.future_id, future.held_id, future.reason));
            }
            for future in failed {
                lines.push(format!("failed: {} {}", future.future_id, future.message));
            }
        }
        DeploymentResult::ReconciliationError { failures, warnings } => {
            lines.push("result: reconciliation error".to_string());
            for failure in failures {
                lines.push(format!("  {failure}"));
            }
            for warning in warnings {
                lines.push(format!("warning: {warning}"));
            }
        }
        DeploymentResult::ValidationError { issues } => {
            lines.push("result: validation error".to_string());
            lines.extend(issues.iter().map(render_issue));
        }
    }
    Ok(lines.join("\n"))
}

fn render_status_text(status: &StatusResult) -> String {
    let mut lines = vec![
        "Ignis status".to_string(),
        format!("chain_id: {}", status.chain_id),
        format!("complete: {}", status.is_complete()),
        format!("successful: {}", status.successful.join(",")),
    ];
    push_list(&mut lines, "started", &status.started);
    push_list(&mut lines, "timed out", &status.timed_out);
    for future in &status.held {
        lines.push(format!("held: {} (#{}) {}", future.future_id, future.held_id, future.reason));
    }
    for future in &status.failed {
        lines.push(format!("failed: {} {}", future.future_id, future.message));
    }
    if !status.contracts.is_empty() {
        lines.push("contracts:".to_string());
        for contract in &status.contracts {
            lines.push(format!("  {} ({}): {}", contract.id, contract.contract_name, contract.address));
        }
    }
    lines.join("\n")
}

fn push_list(lines: &mut Vec<String>, label: &str, ids: &[String]) {
    if !ids.is_empty() {
        lines.push(format!("{label}: {}", ids.join(",")));
    }
}

fn render_issue(issue: &StructuredIssue) -> String {
    match &issue.future_id {
        Some(future_id) => format!("  [{}] {future_id}: {}", issue.kind, issue.message),
        None => format!("  [{}] {}", issue.kind, issue.message),
    }
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
