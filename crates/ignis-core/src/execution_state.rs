use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::execution_result::{
    CallExecutionResult, DeploymentExecutionResult, SendDataExecutionResult, StaticCallExecutionResult,
};
use crate::module::{FutureType, NameOrIndex};
use crate::network_interaction::NetworkInteraction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Started,
    Success,
    Timeout,
    Held,
    Failed,
}

impl ExecutionStatus {
    /// Terminal for the current run. Only `Started` may still progress.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Started)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyConfigValue {
    Number(serde_json::Number),
    Text(String),
}

pub type StrategyConfig = BTreeMap<String, StrategyConfigValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStateBase {
    pub id: String,
    pub future_type: FutureType,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub artifact_id: String,
    pub contract_name: String,
    pub constructor_args: Vec<Value>,
    pub libraries: BTreeMap<String, String>,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DeploymentExecutionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub artifact_id: String,
    pub contract_address: String,
    pub function_name: String,
    pub args: Vec<Value>,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CallExecutionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticCallExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub artifact_id: String,
    pub contract_address: String,
    pub function_name: String,
    pub args: Vec<Value>,
    pub name_or_index: NameOrIndex,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StaticCallExecutionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeFunctionCallExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub artifact_id: String,
    pub function_name: String,
    pub args: Vec<Value>,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAtExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub artifact_id: String,
    pub contract_name: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadEventArgumentExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub artifact_id: String,
    pub event_name: String,
    pub name_or_index: NameOrIndex,
    pub tx_to_read_from: String,
    pub emitter_address: String,
    pub event_index: u64,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendDataExecutionState {
    #[serde(flatten)]
    pub base: ExecutionStateBase,
    pub to: String,
    pub data: String,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
    pub network_interactions: Vec<NetworkInteraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SendDataExecutionResult>,
}

/// Progress of one future, rebuilt from the journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    #[serde(rename = "DEPLOYMENT_EXECUTION_STATE")]
    Deployment(DeploymentExecutionState),
    #[serde(rename = "CALL_EXECUTION_STATE")]
    Call(CallExecutionState),
    #[serde(rename = "STATIC_CALL_EXECUTION_STATE")]
    StaticCall(StaticCallExecutionState),
    #[serde(rename = "ENCODE_FUNCTION_CALL_EXECUTION_STATE")]
    EncodeFunctionCall(EncodeFunctionCallExecutionState),
    #[serde(rename = "CONTRACT_AT_EXECUTION_STATE")]
    ContractAt(ContractAtExecutionState),
    #[serde(rename = "READ_EVENT_ARGUMENT_EXECUTION_STATE")]
    ReadEventArgument(ReadEventArgumentExecutionState),
    #[serde(rename = "SEND_DATA_EXECUTION_STATE")]
    SendData(SendDataExecutionState),
}

impl ExecutionState {
    pub fn base(&self) -> &ExecutionStateBase {
        match self {
            Self::Deployment(state) => &state.base,
            Self::Call(state) => &state.base,
            Self::StaticCall(state) => &state.base,
            Self::EncodeFunctionCall(state) => &state.base,
            Self::ContractAt(state) => &state.base,
            Self::ReadEventArgument(state) => &state.base,
            Self::SendData(state) => &state.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ExecutionStateBase {
        match self {
            Self::Deployment(state) => &mut state.base,
            Self::Call(state) => &mut state.base,
            Self::StaticCall(state) => &mut state.base,
            Self::EncodeFunctionCall(state) => &mut state.base,
            Self::ContractAt(state) => &mut state.base,
            Self::ReadEventArgument(state) => &mut state.base,
            Self::SendData(state) => &mut state.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn status(&self) -> ExecutionStatus {
        self.base().status
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Deployment(_) => "DEPLOYMENT_EXECUTION_STATE",
            Self::Call(_) => "CALL_EXECUTION_STATE",
            Self::StaticCall(_) => "STATIC_CALL_EXECUTION_STATE",
            Self::EncodeFunctionCall(_) => "ENCODE_FUNCTION_CALL_EXECUTION_STATE",
            Self::ContractAt(_) => "CONTRACT_AT_EXECUTION_STATE",
            Self::ReadEventArgument(_) => "READ_EVENT_ARGUMENT_EXECUTION_STATE",
            Self::SendData(_) => "SEND_DATA_EXECUTION_STATE",
        }
    }

    /// Interactions of the kinds that talk to the network.
    pub fn network_interactions(&self) -> Option<&[NetworkInteraction]> {
        match self {
            Self::Deployment(state) => Some(&state.network_interactions),
            Self::Call(state) => Some(&state.network_interactions),
            Self::StaticCall(state) => Some(&state.network_interactions),
            Self::SendData(state) => Some(&state.network_interactions),
            Self::EncodeFunctionCall(_) | Self::ContractAt(_) | Self::ReadEventArgument(_) => None,
        }
    }

    pub fn network_interactions_mut(&mut self) -> Option<&mut Vec<NetworkInteraction>> {
        match self {
            Self::Deployment(state) => Some(&mut state.network_interactions),
            Self::Call(state) => Some(&mut state.network_interactions),
            Self::StaticCall(state) => Some(&mut state.network_interactions),
            Self::SendData(state) => Some(&mut state.network_interactions),
            Self::EncodeFunctionCall(_) | Self::ContractAt(_) | Self::ReadEventArgument(_) => None,
        }
    }

    /// Sender of the transactions of this state, if it sends any.
    pub fn from(&self) -> Option<&str> {
        match self {
            Self::Deployment(state) => Some(&state.from),
            Self::Call(state) => Some(&state.from),
            Self::StaticCall(state) => Some(&state.from),
            Self::SendData(state) => Some(&state.from),
            Self::EncodeFunctionCall(_) | Self::ContractAt(_) | Self::ReadEventArgument(_) => None,
        }
    }

    /// Whether a result has been recorded. Synchronous kinds always have one.
    pub fn has_result(&self) -> bool {
        match self {
            Self::Deployment(state) => state.result.is_some(),
            Self::Call(state) => state.result.is_some(),
            Self::StaticCall(state) => state.result.is_some(),
            Self::SendData(state) => state.result.is_some(),
            Self::EncodeFunctionCall(_) | Self::ContractAt(_) | Self::ReadEventArgument(_) => true,
        }
    }

    /// JSON value other futures see when they reference this one.
    pub fn result_value(&self) -> Option<Value> {
        match self {
            Self::Deployment(state) => state
                .result
                .as_ref()
                .and_then(|result| result.success())
                .map(|success| Value::String(success.address.clone())),
            Self::Call(state) => state
                .result
                .as_ref()
                .and_then(|result| result.success())
                .map(|success| Value::String(success.tx_hash.clone())),
            Self::SendData(state) => state
                .result
                .as_ref()
                .and_then(|result| result.success())
                .map(|success| Value::String(success.tx_hash.clone())),
            Self::StaticCall(state) => state
                .result
                .as_ref()
                .and_then(|result| result.success())
                .map(|success| success.value.clone()),
            Self::EncodeFunctionCall(state) => Some(Value::String(state.result.clone())),
            Self::ContractAt(state) => Some(Value::String(state.contract_address.clone())),
            Self::ReadEventArgument(state) => Some(state.result.clone()),
        }
    }

    /// Failure description for FAILED states.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Deployment(state) => state.result.as_ref().and_then(|result| result.failure_message()),
            Self::Call(state) => state.result.as_ref().and_then(|result| result.failure_message()),
            Self::StaticCall(state) => state.result.as_ref().and_then(|result| result.failure_message()),
            Self::SendData(state) => state.result.as_ref().and_then(|result| result.failure_message()),
            Self::EncodeFunctionCall(_) | Self::ContractAt(_) | Self::ReadEventArgument(_) => None,
        }
    }
}
