use std::collections::BTreeMap;

use ignis_core::{NameOrIndex, TransactionLog};
use serde_json::Value;

use super::Artifact;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("function `{function_name}` not found in `{contract_name}`")]
    UnknownFunction {
        contract_name: String,
        function_name: String,
    },
    #[error("`{function_name}` of `{contract_name}` takes {expected} arguments, got {actual}")]
    ArgumentCount {
        contract_name: String,
        function_name: String,
        expected: usize,
        actual: usize,
    },
    #[error("`{name}` has no output or argument `{selector}`")]
    UnknownOutput { name: String, selector: String },
    #[error("event `{event_name}` not found in `{contract_name}`")]
    UnknownEvent {
        contract_name: String,
        event_name: String,
    },
    #[error("event `{event_name}` #{event_index} not found in transaction logs")]
    EventNotFound { event_name: String, event_index: u64 },
    #[error("missing library `{0}` for linking")]
    MissingLibrary(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// ABI encoding as the engine needs it. Implementations decide how JSON
/// arguments map onto solidity types.
pub trait AbiCodec {
    /// Linked bytecode followed by the encoded constructor arguments.
    fn encode_deployment(
        &self,
        artifact: &Artifact,
        args: &[Value],
        libraries: &BTreeMap<String, String>,
    ) -> Result<String, CodecError>;

    fn encode_function_call(&self, artifact: &Artifact, function_name: &str, args: &[Value]) -> Result<String, CodecError>;

    /// The constructor takes `arg_count` arguments.
    fn check_constructor(&self, artifact: &Artifact, arg_count: usize) -> Result<(), CodecError>;

    /// `function_name` exists with `arg_count` parameters and, when given,
    /// `output` names or indexes one of its outputs.
    fn check_function(
        &self,
        artifact: &Artifact,
        function_name: &str,
        arg_count: usize,
        output: Option<&NameOrIndex>,
    ) -> Result<(), CodecError>;

    /// `event_name` exists and `argument` names or indexes one of its inputs.
    fn check_event_argument(&self, artifact: &Artifact, event_name: &str, argument: &NameOrIndex)
        -> Result<(), CodecError>;

    fn decode_function_result(
        &self,
        artifact: &Artifact,
        function_name: &str,
        return_data: &str,
        name_or_index: &NameOrIndex,
    ) -> Result<Value, CodecError>;

    /// Best effort description of revert data.
    fn decode_error(&self, artifact: Option<&Artifact>, return_data: &str) -> String;

    /// Argument of the `event_index`-th `event_name` log emitted by
    /// `emitter_address`.
    fn decode_event_argument(
        &self,
        artifact: &Artifact,
        event_name: &str,
        event_index: u64,
        name_or_index: &NameOrIndex,
        emitter_address: &str,
        logs: &[TransactionLog],
    ) -> Result<Value, CodecError>;
}
