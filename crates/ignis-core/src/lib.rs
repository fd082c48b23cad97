pub mod amount;
pub mod deployment_state;
pub mod execution_result;
pub mod execution_state;
pub mod future_id;
pub mod issues;
pub mod messages;
pub mod module;
pub mod network_interaction;

pub use deployment_state::{DeploymentState, UNINITIALIZED_CHAIN_ID};
pub use execution_result::{
    CallExecutionResult, DeploymentExecutionResult, DeploymentSuccess, ExecutionResult, SendDataExecutionResult,
    StaticCallExecutionResult, StaticCallSuccess, TransactionSuccess,
};
pub use execution_state::{
    CallExecutionState, ContractAtExecutionState, DeploymentExecutionState, EncodeFunctionCallExecutionState,
    ExecutionState, ExecutionStateBase, ExecutionStatus, ReadEventArgumentExecutionState, SendDataExecutionState,
    StaticCallExecutionState, StrategyConfig, StrategyConfigValue,
};
pub use issues::{IssueSeverity, StructuredIssue};
pub use messages::{
    decode_journal_message_line, encode_journal_message_line, CallExecutionStateCompleteMessage,
    CallExecutionStateInitializeMessage, ContractAtExecutionStateInitializeMessage,
    DeploymentExecutionStateCompleteMessage, DeploymentExecutionStateInitializeMessage,
    DeploymentInitializeMessage, EncodeFunctionCallExecutionStateInitializeMessage, ExecutionStateCompleteMessage,
    JournalMessage, NetworkInteractionRequestMessage, OnchainInteractionMessage,
    ReadEventArgumentExecutionStateInitializeMessage, SendDataExecutionStateCompleteMessage,
    SendDataExecutionStateInitializeMessage, StaticCallCompleteMessage, StaticCallExecutionStateCompleteMessage,
    StaticCallExecutionStateInitializeMessage, TransactionConfirmMessage, TransactionPrepareSendMessage,
    TransactionSendMessage, WipeApplyMessage,
};
pub use module::{
    account_reference, build_deployment_module, collect_future_references, future_reference, module_parameters,
    parameter_reference, AccountRef, DeploymentModule, DeploymentParameters, Future, FutureDefinition, FutureKind,
    FutureType, ModuleDefinition, ModuleParameters, NameOrIndex, ParameterReference, ParameterType, ParameterUse,
    GLOBAL_PARAMETERS,
};
pub use network_interaction::{
    NetworkFees, NetworkInteraction, NetworkInteractionRequest, OnchainInteraction, RawStaticCallResult,
    StaticCallInteraction, Transaction, TransactionLog, TransactionReceipt, TransactionReceiptStatus,
};
