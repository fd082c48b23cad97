mod listener;
mod types;

pub use listener::{read_event_log, EventLogError, ExecutionEventListener, JsonlEventWriter, RecordingListener};
pub use types::{
    ensure_monotonic_sequence, ExecutionEvent, ExecutionEventRecord, ExecutionEventSequenceError, ExecutionEventStream,
    ExecutionEventType, EXECUTION_EVENT_SCHEMA_0_0_1,
};
