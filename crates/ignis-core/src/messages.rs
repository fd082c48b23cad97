//! Journal messages. Every state change of a deployment is one of these,
//! appended to the journal before it is applied.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::execution_result::{
    CallExecutionResult, DeploymentExecutionResult, SendDataExecutionResult, StaticCallExecutionResult,
};
use crate::execution_state::StrategyConfig;
use crate::module::{FutureType, NameOrIndex};
use crate::network_interaction::{
    NetworkInteractionRequest, RawStaticCallResult, Transaction, TransactionReceipt,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInitializeMessage {
    pub chain_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipeApplyMessage {
    pub future_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentExecutionStateInitializeMessage {
    pub future_id: String,
    pub future_type: FutureType,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub artifact_id: String,
    pub contract_name: String,
    #[serde(default)]
    pub constructor_args: Vec<Value>,
    #[serde(default)]
    pub libraries: BTreeMap<String, String>,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExecutionStateInitializeMessage {
    pub future_id: String,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub artifact_id: String,
    pub contract_address: String,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticCallExecutionStateInitializeMessage {
    pub future_id: String,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub artifact_id: String,
    pub contract_address: String,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    pub name_or_index: NameOrIndex,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeFunctionCallExecutionStateInitializeMessage {
    pub future_id: String,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub artifact_id: String,
    pub function_name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAtExecutionStateInitializeMessage {
    pub future_id: String,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub artifact_id: String,
    pub contract_name: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadEventArgumentExecutionStateInitializeMessage {
    pub future_id: String,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub artifact_id: String,
    pub event_name: String,
    pub name_or_index: NameOrIndex,
    pub tx_to_read_from: String,
    pub emitter_address: String,
    pub event_index: u64,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendDataExecutionStateInitializeMessage {
    pub future_id: String,
    pub strategy: String,
    #[serde(default)]
    pub strategy_config: StrategyConfig,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    pub to: String,
    pub data: String,
    #[serde(with = "crate::amount")]
    pub value: u128,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStateCompleteMessage<R> {
    pub future_id: String,
    pub result: R,
}

pub type DeploymentExecutionStateCompleteMessage = ExecutionStateCompleteMessage<DeploymentExecutionResult>;
pub type CallExecutionStateCompleteMessage = ExecutionStateCompleteMessage<CallExecutionResult>;
pub type StaticCallExecutionStateCompleteMessage = ExecutionStateCompleteMessage<StaticCallExecutionResult>;
pub type SendDataExecutionStateCompleteMessage = ExecutionStateCompleteMessage<SendDataExecutionResult>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInteractionRequestMessage {
    pub future_id: String,
    pub network_interaction: NetworkInteractionRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPrepareSendMessage {
    pub future_id: String,
    pub network_interaction_id: u32,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSendMessage {
    pub future_id: String,
    pub network_interaction_id: u32,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfirmMessage {
    pub future_id: String,
    pub network_interaction_id: u32,
    pub hash: String,
    pub receipt: TransactionReceipt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCallCompleteMessage {
    pub future_id: String,
    pub network_interaction_id: u32,
    pub result: RawStaticCallResult,
}

/// Payload shared by the onchain interaction lifecycle signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnchainInteractionMessage {
    pub future_id: String,
    pub network_interaction_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalMessage {
    DeploymentInitialize(DeploymentInitializeMessage),
    WipeApply(WipeApplyMessage),
    DeploymentExecutionStateInitialize(DeploymentExecutionStateInitializeMessage),
    CallExecutionStateInitialize(CallExecutionStateInitializeMessage),
    StaticCallExecutionStateInitialize(StaticCallExecutionStateInitializeMessage),
    EncodeFunctionCallExecutionStateInitialize(EncodeFunctionCallExecutionStateInitializeMessage),
    ContractAtExecutionStateInitialize(ContractAtExecutionStateInitializeMessage),
    ReadEventArgumentExecutionStateInitialize(ReadEventArgumentExecutionStateInitializeMessage),
    SendDataExecutionStateInitialize(SendDataExecutionStateInitializeMessage),
    DeploymentExecutionStateComplete(DeploymentExecutionStateCompleteMessage),
    CallExecutionStateComplete(CallExecutionStateCompleteMessage),
    StaticCallExecutionStateComplete(StaticCallExecutionStateCompleteMessage),
    SendDataExecutionStateComplete(SendDataExecutionStateCompleteMessage),
    NetworkInteractionRequest(NetworkInteractionRequestMessage),
    TransactionPrepareSend(TransactionPrepareSendMessage),
    TransactionSend(TransactionSendMessage),
    TransactionConfirm(TransactionConfirmMessage),
    StaticCallComplete(StaticCallCompleteMessage),
    OnchainInteractionBumpFees(OnchainInteractionMessage),
    OnchainInteractionDropped(OnchainInteractionMessage),
    OnchainInteractionReplacedByUser(OnchainInteractionMessage),
    OnchainInteractionTimeout(OnchainInteractionMessage),
}

impl JournalMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::DeploymentInitialize(_) => "DEPLOYMENT_INITIALIZE",
            Self::WipeApply(_) => "WIPE_APPLY",
            Self::DeploymentExecutionStateInitialize(_) => "DEPLOYMENT_EXECUTION_STATE_INITIALIZE",
            Self::CallExecutionStateInitialize(_) => "CALL_EXECUTION_STATE_INITIALIZE",
            Self::StaticCallExecutionStateInitialize(_) => "STATIC_CALL_EXECUTION_STATE_INITIALIZE",
            Self::EncodeFunctionCallExecutionStateInitialize(_) => "ENCODE_FUNCTION_CALL_EXECUTION_STATE_INITIALIZE",
            Self::ContractAtExecutionStateInitialize(_) => "CONTRACT_AT_EXECUTION_STATE_INITIALIZE",
            Self::ReadEventArgumentExecutionStateInitialize(_) => "READ_EVENT_ARGUMENT_EXECUTION_STATE_INITIALIZE",
            Self::SendDataExecutionStateInitialize(_) => "SEND_DATA_EXECUTION_STATE_INITIALIZE",
            Self::DeploymentExecutionStateComplete(_) => "DEPLOYMENT_EXECUTION_STATE_COMPLETE",
            Self::CallExecutionStateComplete(_) => "CALL_EXECUTION_STATE_COMPLETE",
            Self::StaticCallExecutionStateComplete(_) => "STATIC_CALL_EXECUTION_STATE_COMPLETE",
            Self::SendDataExecutionStateComplete(_) => "SEND_DATA_EXECUTION_STATE_COMPLETE",
            Self::NetworkInteractionRequest(_) => "NETWORK_INTERACTION_REQUEST",
            Self::TransactionPrepareSend(_) => "TRANSACTION_PREPARE_SEND",
            Self::TransactionSend(_) => "TRANSACTION_SEND",
            Self::TransactionConfirm(_) => "TRANSACTION_CONFIRM",
            Self::StaticCallComplete(_) => "STATIC_CALL_COMPLETE",
            Self::OnchainInteractionBumpFees(_) => "ONCHAIN_INTERACTION_BUMP_FEES",
            Self::OnchainInteractionDropped(_) => "ONCHAIN_INTERACTION_DROPPED",
            Self::OnchainInteractionReplacedByUser(_) => "ONCHAIN_INTERACTION_REPLACED_BY_USER",
            Self::OnchainInteractionTimeout(_) => "ONCHAIN_INTERACTION_TIMEOUT",
        }
    }

    /// Future the message applies to. `None` for deployment level messages.
    pub fn future_id(&self) -> Option<&str> {
        let id = match self {
            Self::DeploymentInitialize(_) => return None,
            Self::WipeApply(message) => &message.future_id,
            Self::DeploymentExecutionStateInitialize(message) => &message.future_id,
            Self::CallExecutionStateInitialize(message) => &message.future_id,
            Self::StaticCallExecutionStateInitialize(message) => &message.future_id,
            Self::EncodeFunctionCallExecutionStateInitialize(message) => &message.future_id,
            Self::ContractAtExecutionStateInitialize(message) => &message.future_id,
            Self::ReadEventArgumentExecutionStateInitialize(message) => &message.future_id,
            Self::SendDataExecutionStateInitialize(message) => &message.future_id,
            Self::DeploymentExecutionStateComplete(message) => &message.future_id,
            Self::CallExecutionStateComplete(message) => &message.future_id,
            Self::StaticCallExecutionStateComplete(message) => &message.future_id,
            Self::SendDataExecutionStateComplete(message) => &message.future_id,
            Self::NetworkInteractionRequest(message) => &message.future_id,
            Self::TransactionPrepareSend(message) => &message.future_id,
            Self::TransactionSend(message) => &message.future_id,
            Self::TransactionConfirm(message) => &message.future_id,
            Self::StaticCallComplete(message) => &message.future_id,
            Self::OnchainInteractionBumpFees(message)
            | Self::OnchainInteractionDropped(message)
            | Self::OnchainInteractionReplacedByUser(message)
            | Self::OnchainInteractionTimeout(message) => &message.future_id,
        };
        Some(id)
    }

    /// Network interaction the message applies to, if any.
    pub fn network_interaction_id(&self) -> Option<u32> {
        match self {
            Self::NetworkInteractionRequest(message) => Some(message.network_interaction.id()),
            Self::TransactionPrepareSend(message) => Some(message.network_interaction_id),
            Self::TransactionSend(message) => Some(message.network_interaction_id),
            Self::TransactionConfirm(message) => Some(message.network_interaction_id),
            Self::StaticCallComplete(message) => Some(message.network_interaction_id),
            Self::OnchainInteractionBumpFees(message)
            | Self::OnchainInteractionDropped(message)
            | Self::OnchainInteractionReplacedByUser(message)
            | Self::OnchainInteractionTimeout(message) => Some(message.network_interaction_id),
            _ => None,
        }
    }
}

pub fn encode_journal_message_line(message: &JournalMessage) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_journal_message_line(line: &str) -> serde_json::Result<JournalMessage> {
    serde_json::from_str::<JournalMessage>(line.trim_end())
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
