use ignis_core::JournalMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EXECUTION_EVENT_SCHEMA_0_0_1: &str = "ignis-execution-event/0.0.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionEventType {
    RunStart,
    DeploymentStart,
    SetModuleId,
    SetStrategy,
    ReconciliationWarnings,
    BatchInitialize,
    BeginNextBatch,
    DeploymentComplete,
    DeploymentInitialize,
    WipeApply,
    DeploymentExecutionStateInitialize,
    CallExecutionStateInitialize,
    StaticCallExecutionStateInitialize,
    EncodeFunctionCallExecutionStateInitialize,
    ContractAtExecutionStateInitialize,
    ReadEventArgumentExecutionStateInitialize,
    SendDataExecutionStateInitialize,
    DeploymentExecutionStateComplete,
    CallExecutionStateComplete,
    StaticCallExecutionStateComplete,
    SendDataExecutionStateComplete,
    NetworkInteractionRequest,
    TransactionPrepareSend,
    TransactionSend,
    TransactionConfirm,
    StaticCallComplete,
    OnchainInteractionBumpFees,
    OnchainInteractionDropped,
    OnchainInteractionReplacedByUser,
    OnchainInteractionTimeout,
}

impl ExecutionEventType {
    pub fn for_message(message: &JournalMessage) -> Self {
        match message {
            JournalMessage::DeploymentInitialize(_) => Self::DeploymentInitialize,
            JournalMessage::WipeApply(_) => Self::WipeApply,
            JournalMessage::DeploymentExecutionStateInitialize(_) => Self::DeploymentExecutionStateInitialize,
            JournalMessage::CallExecutionStateInitialize(_) => Self::CallExecutionStateInitialize,
            JournalMessage::StaticCallExecutionStateInitialize(_) => Self::StaticCallExecutionStateInitialize,
            JournalMessage::EncodeFunctionCallExecutionStateInitialize(_) => {
                Self::EncodeFunctionCallExecutionStateInitialize
            }
            JournalMessage::ContractAtExecutionStateInitialize(_) => Self::ContractAtExecutionStateInitialize,
            JournalMessage::ReadEventArgumentExecutionStateInitialize(_) => Self::ReadEventArgumentExecutionStateInitialize,
            JournalMessage::SendDataExecutionStateInitialize(_) => Self::SendDataExecutionStateInitialize,
            JournalMessage::DeploymentExecutionStateComplete(_) => Self::DeploymentExecutionStateComplete,
            JournalMessage::CallExecutionStateComplete(_) => Self::CallExecutionStateComplete,
            JournalMessage::StaticCallExecutionStateComplete(_) => Self::StaticCallExecutionStateComplete,
            JournalMessage::SendDataExecutionStateComplete(_) => Self::SendDataExecutionStateComplete,
            JournalMessage::NetworkInteractionRequest(_) => Self::NetworkInteractionRequest,
            JournalMessage::TransactionPrepareSend(_) => Self::TransactionPrepareSend,
            JournalMessage::TransactionSend(_) => Self::TransactionSend,
            JournalMessage::TransactionConfirm(_) => Self::TransactionConfirm,
            JournalMessage::StaticCallComplete(_) => Self::StaticCallComplete,
            JournalMessage::OnchainInteractionBumpFees(_) => Self::OnchainInteractionBumpFees,
            JournalMessage::OnchainInteractionDropped(_) => Self::OnchainInteractionDropped,
            JournalMessage::OnchainInteractionReplacedByUser(_) => Self::OnchainInteractionReplacedByUser,
            JournalMessage::OnchainInteractionTimeout(_) => Self::OnchainInteractionTimeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionEvent {
    #[serde(rename = "type")]
    pub event_type: ExecutionEventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub future_id: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl ExecutionEvent {
    pub fn new(event_type: ExecutionEventType) -> Self {
        Self {
            event_type,
            future_id: None,
            data: Map::new(),
        }
    }

    pub fn with_future_id(mut self, future_id: impl Into<String>) -> Self {
        self.future_id = Some(future_id.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Projection of an applied journal message: the message fields become
    /// the event data.
    pub fn from_message(message: &JournalMessage) -> Self {
        let mut data = match serde_json::to_value(message) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        data.remove("type");
        data.remove("future_id");
        Self {
            event_type: ExecutionEventType::for_message(message),
            future_id: message.future_id().map(str::to_string),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionEventRecord {
    pub schema: String,
    pub run_id: String,
    pub seq: u64,
    pub event: ExecutionEvent,
}

impl ExecutionEventRecord {
    pub fn new(run_id: impl Into<String>, seq: u64, event: ExecutionEvent) -> Self {
        Self {
            schema: EXECUTION_EVENT_SCHEMA_0_0_1.to_string(),
            run_id: run_id.into(),
            seq,
            event,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionEventStream {
    run_id: String,
    next_seq: u64,
}

impl ExecutionEventStream {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            next_seq: 0,
        }
    }

    pub fn next_record(&mut self, event: ExecutionEvent) -> ExecutionEventRecord {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        ExecutionEventRecord::new(self.run_id.clone(), seq, event)
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionEventSequenceError {
    #[error("sequence is empty")]
    Empty,
    #[error("sequence must start at 0, got {actual}")]
    InvalidStart { actual: u64 },
    #[error("sequence is not monotonic at index {index}: expected {expected}, got {actual}")]
    NonMonotonic { index: usize, expected: u64, actual: u64 },
}

pub fn ensure_monotonic_sequence(records: &[ExecutionEventRecord]) -> Result<(), ExecutionEventSequenceError> {
    let Some(first) = records.first() else {
        return Err(ExecutionEventSequenceError::Empty);
    };
    if first.seq != 0 {
        return Err(ExecutionEventSequenceError::InvalidStart { actual: first.seq });
    }
    for (index, pair) in records.windows(2).enumerate() {
        let expected = pair[0].seq + 1;
        if pair[1].seq != expected {
            return Err(ExecutionEventSequenceError::NonMonotonic {
                index: index + 1,
                expected,
                actual: pair[1].seq,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
