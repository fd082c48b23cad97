//! Turns module-level values (`{"future": id}`, `{"account": n}` and
//! `{"parameter": name}` references, amounts, senders) into the concrete
//! values recorded in the journal.

use std::collections::BTreeMap;

use ignis_core::{
    account_reference, amount::parse_amount, future_reference, parameter_reference, AccountRef, DeploymentModule,
    DeploymentState, ModuleParameters,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("future {0} has no result to reference")]
    MissingResult(String),
    #[error("account index {index} is out of range, {available} accounts available")]
    AccountOutOfRange { index: usize, available: usize },
    #[error("expected an address, got {0}")]
    InvalidAddress(String),
    #[error("{0}")]
    InvalidAmount(String),
    #[error("future {0} is not a contract")]
    NotAContract(String),
    #[error("module parameter `{0}` requires a value but was given none")]
    MissingParameter(String),
}

static NO_PARAMETERS: ModuleParameters = ModuleParameters::new();

pub struct ResolutionContext<'a> {
    pub module: &'a DeploymentModule,
    pub state: &'a DeploymentState,
    pub accounts: &'a [String],
    pub default_sender: &'a str,
    pub parameters: &'a ModuleParameters,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        module: &'a DeploymentModule,
        state: &'a DeploymentState,
        accounts: &'a [String],
        default_sender: &'a str,
    ) -> Self {
        Self {
            module,
            state,
            accounts,
            default_sender,
            parameters: &NO_PARAMETERS,
        }
    }

    pub fn with_parameters(mut self, parameters: &'a ModuleParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn value(&self, value: &Value) -> Result<Value, ResolveError> {
        if let Some(target) = future_reference(value) {
            return self.result_of(target);
        }
        if let Some(index) = account_reference(value) {
            return self.account(index).map(Value::String);
        }
        if let Some(reference) = parameter_reference(value) {
            return self
                .parameters
                .get(reference.name)
                .or(reference.default)
                .cloned()
                .ok_or_else(|| ResolveError::MissingParameter(reference.name.to_string()));
        }
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.value(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(key, item)| self.value(item).map(|resolved| (key.clone(), resolved)))
                .collect::<Result<serde_json::Map<_, _>, _>>()
                .map(Value::Object),
            other => Ok(other.clone()),
        }
    }

    pub fn values(&self, values: &[Value]) -> Result<Vec<Value>, ResolveError> {
        values.iter().map(|value| self.value(value)).collect()
    }

    pub fn sender(&self, from: Option<&AccountRef>) -> Result<String, ResolveError> {
        match from {
            None => Ok(self.default_sender.to_string()),
            Some(AccountRef::Account { account }) => self.account(*account),
            Some(AccountRef::Address(address)) => Ok(address.clone()),
        }
    }

    /// Wei amount; absent means zero.
    pub fn amount(&self, value: Option<&Value>) -> Result<u128, ResolveError> {
        let Some(value) = value else {
            return Ok(0);
        };
        match self.value(value)? {
            Value::Number(number) => number
                .as_u64()
                .map(u128::from)
                .ok_or_else(|| ResolveError::InvalidAmount(format!("invalid amount `{number}`"))),
            Value::String(raw) => parse_amount(&raw).map_err(ResolveError::InvalidAmount),
            other => Err(ResolveError::InvalidAmount(format!("invalid amount `{other}`"))),
        }
    }

    pub fn address(&self, value: &Value) -> Result<String, ResolveError> {
        match self.value(value)? {
            Value::String(address) => Ok(address),
            other => Err(ResolveError::InvalidAddress(other.to_string())),
        }
    }

    pub fn contract_address(&self, future_id: &str) -> Result<String, ResolveError> {
        self.address(&serde_json::json!({ "future": future_id }))
    }

    /// Library name to deployed address.
    pub fn libraries(&self, libraries: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>, ResolveError> {
        libraries
            .iter()
            .map(|(name, future_id)| self.contract_address(future_id).map(|address| (name.clone(), address)))
            .collect()
    }

    /// Artifact of the contract future a call targets.
    pub fn artifact_of(&self, contract_future_id: &str) -> Result<String, ResolveError> {
        self.module
            .future(contract_future_id)
            .and_then(|future| future.artifact_id())
            .map(str::to_string)
            .ok_or_else(|| ResolveError::NotAContract(contract_future_id.to_string()))
    }

    fn result_of(&self, future_id: &str) -> Result<Value, ResolveError> {
        self.state
            .execution_state(future_id)
            .and_then(|execution_state| execution_state.result_value())
            .ok_or_else(|| ResolveError::MissingResult(future_id.to_string()))
    }

    fn account(&self, index: usize) -> Result<String, ResolveError> {
        self.accounts
            .get(index)
            .cloned()
            .ok_or(ResolveError::AccountOutOfRange {
                index,
                available: self.accounts.len(),
            })
    }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
