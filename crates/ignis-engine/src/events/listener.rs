use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tracing::warn;

use super::types::{ensure_monotonic_sequence, ExecutionEventRecord, ExecutionEventSequenceError};

/// Receives progress events. Listeners observe, they never steer execution.
pub trait ExecutionEventListener {
    fn on_event(&mut self, record: &ExecutionEventRecord);
}

/// Keeps every record, mostly for tests and JSON output.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    pub records: Vec<ExecutionEventRecord>,
}

impl ExecutionEventListener for RecordingListener {
    fn on_event(&mut self, record: &ExecutionEventRecord) {
        self.records.push(record.clone());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("event log io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid event record at line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("run `{run_id}`: {source}")]
    Sequence {
        run_id: String,
        #[source]
        source: ExecutionEventSequenceError,
    },
}

/// Streams records as JSONL, one record per line, flushed per record.
pub struct JsonlEventWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonlEventWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &ExecutionEventRecord) -> Result<(), EventLogError> {
        let mut line = serde_json::to_vec(record).map_err(std::io::Error::other)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> ExecutionEventListener for JsonlEventWriter<W> {
    fn on_event(&mut self, record: &ExecutionEventRecord) {
        if let Err(error) = self.write_record(record) {
            warn!(seq = record.seq, %error, "failed to write execution event");
        }
    }
}

/// Reads a JSONL event log back, grouped by run. Several runs may share one
/// file; each run's records must form a gapless sequence from 0.
pub fn read_event_log(reader: impl BufRead) -> Result<BTreeMap<String, Vec<ExecutionEventRecord>>, EventLogError> {
    let mut runs = BTreeMap::<String, Vec<ExecutionEventRecord>>::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str::<ExecutionEventRecord>(line.as_str())
            .map_err(|source| EventLogError::InvalidLine { line: index + 1, source })?;
        runs.entry(record.run_id.clone()).or_default().push(record);
    }
    for (run_id, records) in &runs {
        ensure_monotonic_sequence(records).map_err(|source| EventLogError::Sequence {
            run_id: run_id.clone(),
            source,
        })?;
    }
    Ok(runs)
}
