pub mod batcher;
pub mod chain;
pub mod engine;
pub mod events;
pub mod journal;
pub mod next_action;
pub mod reconciliation;
pub mod reducer;
pub mod resolve;
pub mod strategy;
pub mod views;
pub mod wiper;

#[cfg(test)]
mod test_support;

pub use batcher::{batch_futures, BatchError};
pub use chain::{BlockInfo, BlockTag, CallParams, ChainClient, ChainError, TransactionParams};
pub use engine::{
    DeploymentResult, DropPolicy, EngineError, EngineOptions, ExecutionEngine, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_FEE_BUMPS, DEFAULT_REQUIRED_CONFIRMATIONS, DEFAULT_TIME_BEFORE_BUMPING_FEES, FEE_BUMP_PERCENT,
};
pub use events::{
    ensure_monotonic_sequence, read_event_log, EventLogError, ExecutionEvent, ExecutionEventListener, ExecutionEventRecord, ExecutionEventSequenceError, ExecutionEventStream,
    ExecutionEventType, JsonlEventWriter, RecordingListener, EXECUTION_EVENT_SCHEMA_0_0_1,
};
pub use journal::{apply_new_message, load_deployment_state, FileJournal, Journal, JournalError, MemoryJournal};
pub use next_action::{next_action_for_execution_state, next_action_for_network_interactions, NextAction};
pub use reconciliation::{reconcile, ReconciliationContext, ReconciliationFutureFailure, ReconciliationResult};
pub use reducer::{deployment_state_reducer, replay, ReducerError};
pub use resolve::{ResolutionContext, ResolveError};
pub use strategy::{
    AbiCodec, Artifact, ArtifactError, ArtifactResolver, BasicStrategy, CodecError, ExecutionFailure,
    ExecutionStrategy, LinkReference, LinkReferences, StrategyError, StrategyOutcome, StrategyStep,
    BASIC_STRATEGY_NAME,
};
pub use views::{
    find_deployed_contracts, find_onchain_interaction_by, find_static_call_by, find_status, find_transaction_by,
    DeployedContract, FailedFuture, HeldFuture, StatusResult,
};
pub use wiper::{wipe, WipeError};
