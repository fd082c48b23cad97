//! Declarative description of a deployment module.
//!
//! A [`ModuleDefinition`] is what users write (YAML or JSON). It is turned
//! into a [`DeploymentModule`] by [`build_deployment_module`], which assigns
//! full future ids, normalizes references and validates the graph.

mod build;
mod parameters;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use build::build_deployment_module;
pub use parameters::{
    module_parameters, parameter_reference, DeploymentParameters, ModuleParameters, ParameterReference,
    ParameterType, ParameterUse, GLOBAL_PARAMETERS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FutureType {
    ContractDeployment,
    LibraryDeployment,
    ContractAt,
    ContractCall,
    StaticCall,
    EncodeFunctionCall,
    ReadEventArgument,
    SendData,
}

impl FutureType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContractDeployment => "CONTRACT_DEPLOYMENT",
            Self::LibraryDeployment => "LIBRARY_DEPLOYMENT",
            Self::ContractAt => "CONTRACT_AT",
            Self::ContractCall => "CONTRACT_CALL",
            Self::StaticCall => "STATIC_CALL",
            Self::EncodeFunctionCall => "ENCODE_FUNCTION_CALL",
            Self::ReadEventArgument => "READ_EVENT_ARGUMENT",
            Self::SendData => "SEND_DATA",
        }
    }

    pub fn is_contract(self) -> bool {
        matches!(
            self,
            Self::ContractDeployment | Self::LibraryDeployment | Self::ContractAt
        )
    }
}

impl std::fmt::Display for FutureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output selector for static calls and event reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameOrIndex {
    Index(u64),
    Name(String),
}

impl Default for NameOrIndex {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl std::fmt::Display for NameOrIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Sender of a transaction: a literal address or an index into the
/// accounts exposed by the chain client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    Account { account: usize },
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FutureKind {
    ContractDeployment {
        contract_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact_id: Option<String>,
        #[serde(default)]
        args: Vec<Value>,
        #[serde(default)]
        libraries: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<AccountRef>,
    },
    LibraryDeployment {
        library_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact_id: Option<String>,
        #[serde(default)]
        libraries: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<AccountRef>,
    },
    ContractAt {
        contract_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact_id: Option<String>,
        address: Value,
    },
    ContractCall {
        contract: String,
        function_name: String,
        #[serde(default)]
        args: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<AccountRef>,
    },
    StaticCall {
        contract: String,
        function_name: String,
        #[serde(default)]
        args: Vec<Value>,
        #[serde(default)]
        name_or_index: NameOrIndex,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<AccountRef>,
    },
    EncodeFunctionCall {
        contract: String,
        function_name: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    ReadEventArgument {
        future: String,
        event_name: String,
        #[serde(default)]
        name_or_index: NameOrIndex,
        #[serde(default)]
        event_index: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emitter: Option<String>,
    },
    SendData {
        to: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<AccountRef>,
    },
}

impl FutureKind {
    pub fn future_type(&self) -> FutureType {
        match self {
            Self::ContractDeployment { .. } => FutureType::ContractDeployment,
            Self::LibraryDeployment { .. } => FutureType::LibraryDeployment,
            Self::ContractAt { .. } => FutureType::ContractAt,
            Self::ContractCall { .. } => FutureType::ContractCall,
            Self::StaticCall { .. } => FutureType::StaticCall,
            Self::EncodeFunctionCall { .. } => FutureType::EncodeFunctionCall,
            Self::ReadEventArgument { .. } => FutureType::ReadEventArgument,
            Self::SendData { .. } => FutureType::SendData,
        }
    }

    pub fn from_account(&self) -> Option<&AccountRef> {
        match self {
            Self::ContractDeployment { from, .. }
            | Self::LibraryDeployment { from, .. }
            | Self::ContractCall { from, .. }
            | Self::StaticCall { from, .. }
            | Self::SendData { from, .. } => from.as_ref(),
            Self::ContractAt { .. } | Self::EncodeFunctionCall { .. } | Self::ReadEventArgument { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    #[serde(flatten)]
    pub kind: FutureKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDefinition {
    pub id: String,
    #[serde(default)]
    pub futures: Vec<FutureDefinition>,
}

/// A future with its full id, normalized references and the union of its
/// explicit (`after`) and implicit (argument reference) dependencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Future {
    pub id: String,
    pub kind: FutureKind,
    pub dependencies: BTreeSet<String>,
}

impl Future {
    pub fn future_type(&self) -> FutureType {
        self.kind.future_type()
    }

    /// Artifact backing a contract-like future.
    pub fn artifact_id(&self) -> Option<&str> {
        match &self.kind {
            FutureKind::ContractDeployment {
                contract_name,
                artifact_id,
                ..
            }
            | FutureKind::ContractAt {
                contract_name,
                artifact_id,
                ..
            } => Some(artifact_id.as_deref().unwrap_or(contract_name)),
            FutureKind::LibraryDeployment {
                library_name,
                artifact_id,
                ..
            } => Some(artifact_id.as_deref().unwrap_or(library_name)),
            _ => None,
        }
    }

    pub fn contract_name(&self) -> Option<&str> {
        match &self.kind {
            FutureKind::ContractDeployment { contract_name, .. } | FutureKind::ContractAt { contract_name, .. } => {
                Some(contract_name)
            }
            FutureKind::LibraryDeployment { library_name, .. } => Some(library_name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentModule {
    pub id: String,
    pub futures: Vec<Future>,
}

impl DeploymentModule {
    pub fn future(&self, id: &str) -> Option<&Future> {
        self.futures.iter().find(|future| future.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.future(id).is_some()
    }

    /// Accounts referenced by index, in ascending order.
    pub fn referenced_accounts(&self) -> BTreeSet<usize> {
        let mut accounts = BTreeSet::new();
        for future in &self.futures {
            if let Some(AccountRef::Account { account }) = future.kind.from_account() {
                accounts.insert(*account);
            }
            for value in argument_values(&future.kind) {
                collect_account_references(value, &mut accounts);
            }
        }
        accounts
    }
}

/// Target of a `{"future": "<id>"}` reference object.
pub fn future_reference(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get("future")?.as_str()
}

/// Index of an `{"account": n}` reference object.
pub fn account_reference(value: &Value) -> Option<usize> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object
        .get("account")?
        .as_u64()
        .and_then(|index| usize::try_from(index).ok())
}

pub fn collect_future_references(value: &Value, out: &mut BTreeSet<String>) {
    if let Some(target) = future_reference(value) {
        out.insert(target.to_string());
        return;
    }
    if parameter_reference(value).is_some() {
        return;
    }
    match value {
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_future_references(item, out)),
        Value::Object(map) => map
            .values()
            .for_each(|item| collect_future_references(item, out)),
        _ => {}
    }
}

fn collect_account_references(value: &Value, out: &mut BTreeSet<usize>) {
    if let Some(index) = account_reference(value) {
        out.insert(index);
        return;
    }
    if parameter_reference(value).is_some() {
        return;
    }
    match value {
        Value::Array(items) => items
            .iter()
            .for_each(|item| collect_account_references(item, out)),
        Value::Object(map) => map
            .values()
            .for_each(|item| collect_account_references(item, out)),
        _ => {}
    }
}

/// Every JSON value of a future that may carry references.
pub(crate) fn argument_values(kind: &FutureKind) -> Vec<&Value> {
    match kind {
        FutureKind::ContractDeployment { args, value, .. } | FutureKind::ContractCall { args, value, .. } => {
            args.iter().chain(value.iter()).collect()
        }
        FutureKind::StaticCall { args, .. } | FutureKind::EncodeFunctionCall { args, .. } => args.iter().collect(),
        FutureKind::ContractAt { address, .. } => vec![address],
        FutureKind::SendData { to, value, .. } => std::iter::once(to).chain(value.iter()).collect(),
        FutureKind::LibraryDeployment { .. } | FutureKind::ReadEventArgument { .. } => Vec::new(),
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
