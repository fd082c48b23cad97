use ignis_core::{StrategyConfig, StructuredIssue};
use ignis_engine::{DropPolicy, EngineOptions, BASIC_STRATEGY_NAME};
use ignis_evm_client::{EvmRpcEndpoint, LocalAccounts, LocalPrivateKeySigner, ProviderError, SignerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_schema")]
    pub schema: String,
    pub chain: ChainConfig,
    #[serde(default)]
    pub engine: RunnerEngineConfig,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    pub rpc_url: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Private keys of the accounts the deployment may send from, in account
    /// index order.
    #[serde(default)]
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RunnerEngineConfig {
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub max_fee_bumps: Option<u32>,
    #[serde(default)]
    pub time_before_bumping_fees_ms: Option<u64>,
    #[serde(default)]
    pub required_confirmations: Option<u64>,
    #[serde(default)]
    pub block_polling_interval_ms: Option<u64>,
    #[serde(default)]
    pub drop_policy: Option<DropPolicy>,
    #[serde(default)]
    pub max_concurrency: Option<u32>,
    /// Sender of futures without `from`. The first account when unset.
    #[serde(default)]
    pub default_sender: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerConfigError {
    #[error("read runner config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config parse failed: {0}")]
    Parse(String),
    #[error("runner config validation failed: {}", render_issues(.0))]
    Validation(Vec<StructuredIssue>),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Signer(#[from] SignerError),
}

pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, RunnerConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| RunnerConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let mut config = parse_runner_config(raw.as_str(), path.extension().and_then(|ext| ext.to_str()))?;

    let mut issues = validate_runner_config(&config);
    StructuredIssue::sort_stable(&mut issues);
    if !issues.is_empty() {
        return Err(RunnerConfigError::Validation(issues));
    }
    if config.artifacts_dir.is_relative() {
        if let Some(parent) = path.parent() {
            config.artifacts_dir = parent.join(&config.artifacts_dir);
        }
    }
    Ok(config)
}

/// Parses without validating. `extension` picks the format, anything else
/// tries YAML then JSON.
pub fn parse_runner_config(raw: &str, extension: Option<&str>) -> Result<RunnerConfig, RunnerConfigError> {
    let expanded = expand_env_placeholders(raw).map_err(RunnerConfigError::Parse)?;
    let config = match extension {
        Some("json") => serde_json::from_str(expanded.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("json decode error: {error}")))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(expanded.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("yaml decode error: {error}")))?,
        _ => serde_yaml::from_str(expanded.as_str())
            .or_else(|_| serde_json::from_str(expanded.as_str()))
            .map_err(|error| RunnerConfigError::Parse(error.to_string()))?,
    };
    Ok(config)
}

pub fn validate_runner_config(config: &RunnerConfig) -> Vec<StructuredIssue> {
    let mut issues = Vec::<StructuredIssue>::new();
    if config.schema != default_runner_schema() {
        issues.push(config_issue(
            "runner.config.schema",
            format!(
                "unsupported runner config schema `{}` (expected `{}`)",
                config.schema,
                default_runner_schema()
            ),
        ));
    }

    let chain = &config.chain;
    if !is_supported_rpc_url(chain.rpc_url.as_str()) {
        issues.push(config_issue(
            "runner.config.chain.rpc_url",
            "chain.rpc_url must be http(s) or ws(s)".to_string(),
        ));
    }
    if matches!(chain.timeout_ms, Some(0)) {
        issues.push(config_issue(
            "runner.config.chain.timeout",
            "chain.timeout_ms must be > 0".to_string(),
        ));
    }
    if chain.accounts.is_empty() {
        issues.push(config_issue(
            "runner.config.chain.accounts.non_empty",
            "chain.accounts must list at least one private key".to_string(),
        ));
    }
    let mut addresses = BTreeSet::<String>::new();
    for (index, key) in chain.accounts.iter().enumerate() {
        match LocalPrivateKeySigner::from_hex(key.as_str()) {
            Ok(signer) => {
                let address = signer.address_hex();
                if !addresses.insert(address.clone()) {
                    issues.push(config_issue(
                        "runner.config.chain.accounts.duplicate",
                        format!("chain.accounts[{index}] repeats account {address}"),
                    ));
                }
            }
            // the key itself never ends up in the message
            Err(error) => issues.push(config_issue(
                "runner.config.chain.accounts.invalid",
                format!("chain.accounts[{index}] is not a valid private key: {error}"),
            )),
        }
    }

    let engine = &config.engine;
    let strategy = engine.strategy.as_deref().unwrap_or(BASIC_STRATEGY_NAME);
    if strategy != BASIC_STRATEGY_NAME {
        issues.push(config_issue(
            "runner.config.engine.strategy",
            format!("unknown strategy `{strategy}` (available: `{BASIC_STRATEGY_NAME}`)"),
        ));
    } else if !engine.strategy_config.is_empty() {
        issues.push(config_issue(
            "runner.config.engine.strategy_config",
            format!("strategy `{BASIC_STRATEGY_NAME}` takes no strategy_config"),
        ));
    }
    for (field, value) in [
        ("required_confirmations", engine.required_confirmations),
        ("block_polling_interval_ms", engine.block_polling_interval_ms),
        ("max_concurrency", engine.max_concurrency.map(u64::from)),
    ] {
        if value == Some(0) {
            issues.push(config_issue(
                "runner.config.engine.positive",
                format!("engine.{field} must be > 0"),
            ));
        }
    }
    if let Some(sender) = &engine.default_sender {
        if !addresses.contains(&sender.to_ascii_lowercase()) {
            issues.push(config_issue(
                "runner.config.engine.default_sender",
                format!("engine.default_sender {sender} is not one of chain.accounts"),
            ));
        }
    }

    issues
}

pub fn engine_options(config: &RunnerConfig) -> EngineOptions {
    let engine = &config.engine;
    let defaults = EngineOptions::default();
    EngineOptions {
        max_fee_bumps: engine.max_fee_bumps.unwrap_or(defaults.max_fee_bumps),
        time_before_bumping_fees: engine
            .time_before_bumping_fees_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.time_before_bumping_fees),
        required_confirmations: engine.required_confirmations.unwrap_or(defaults.required_confirmations),
        drop_policy: engine.drop_policy.unwrap_or(defaults.drop_policy),
        max_concurrency: engine
            .max_concurrency
            .map(|value| value as usize)
            .unwrap_or(defaults.max_concurrency),
        default_sender: engine.default_sender.as_ref().map(|sender| sender.to_ascii_lowercase()),
    }
}

pub fn build_endpoint(config: &RunnerConfig) -> Result<EvmRpcEndpoint, RunnerConfigError> {
    let mut endpoint = EvmRpcEndpoint::new(config.chain.rpc_url.clone())?;
    if let Some(timeout_ms) = config.chain.timeout_ms {
        endpoint = endpoint.with_timeout_ms(timeout_ms)?;
    }
    if let Some(interval_ms) = config.engine.block_polling_interval_ms {
        endpoint = endpoint.with_block_polling_interval_ms(interval_ms)?;
    }
    Ok(endpoint)
}

pub fn build_accounts(config: &RunnerConfig) -> Result<LocalAccounts, RunnerConfigError> {
    Ok(LocalAccounts::from_hex_keys(config.chain.accounts.as_slice())?)
}

fn config_issue(reference: &str, message: String) -> StructuredIssue {
    StructuredIssue::error("runner_config_error", None, message).with_reference(reference)
}

fn render_issues(issues: &[StructuredIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn default_runner_schema() -> String {
    "ignis-runner/0.0.1".to_string()
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn is_supported_rpc_url(value: &str) -> bool {
    value.starts_with("http://")
        || value.starts_with("https://")
        || value.starts_with("ws://")
        || value.starts_with("wss://")
}

fn expand_env_placeholders(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some((before, after)) = rest.split_once("${") {
        out.push_str(before);
        let (key, tail) = after
            .split_once('}')
            .ok_or_else(|| "unterminated env placeholder `${...`".to_string())?;
        if key.is_empty() {
            return Err("empty env placeholder `${}`".to_string());
        }
        let value = std::env::var(key).map_err(|_| format!("missing env var for placeholder `${{{key}}}`"))?;
        out.push_str(value.as_str());
        rest = tail;
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
