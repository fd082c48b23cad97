use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use ignis_core::{DeploymentState, ExecutionState, JournalMessage};
use tracing::debug;

use super::EngineError;
use crate::events::{ExecutionEvent, ExecutionEventListener, ExecutionEventStream};
use crate::journal::{apply_new_message, Journal};

/// Mutable context of one run: the journal, the state rebuilt from it and
/// the progress event stream. Concurrent futures share it through `&self`;
/// no borrow is held across an await point.
pub(crate) struct ExecutionSession<'s> {
    journal: RefCell<&'s mut dyn Journal>,
    state: RefCell<DeploymentState>,
    events: RefCell<ExecutionEventStream>,
    listener: RefCell<Option<&'s mut dyn ExecutionEventListener>>,
    last_sent: RefCell<BTreeMap<(String, u32), Instant>>,
}

impl<'s> ExecutionSession<'s> {
    pub(crate) fn new(
        journal: &'s mut dyn Journal,
        state: DeploymentState,
        run_id: &str,
        listener: Option<&'s mut dyn ExecutionEventListener>,
    ) -> Self {
        Self {
            journal: RefCell::new(journal),
            state: RefCell::new(state),
            events: RefCell::new(ExecutionEventStream::new(run_id)),
            listener: RefCell::new(listener),
            last_sent: RefCell::new(BTreeMap::new()),
        }
    }

    /// Snapshot of the current state. Cheap: execution states are shared.
    pub(crate) fn state(&self) -> DeploymentState {
        self.state.borrow().clone()
    }

    pub(crate) fn execution_state(&self, future_id: &str) -> Option<Arc<ExecutionState>> {
        self.state.borrow().execution_states.get(future_id).cloned()
    }

    /// Writes `message` to the journal, applies it and reports it.
    pub(crate) fn record(&self, message: JournalMessage) -> Result<(), EngineError> {
        let current = self.state();
        let next = {
            let mut journal = self.journal.borrow_mut();
            apply_new_message(&mut **journal, current, &message)?
        };
        *self.state.borrow_mut() = next;
        debug!(
            message_type = message.message_type(),
            future_id = message.future_id().unwrap_or_default(),
            "recorded journal message"
        );
        self.emit(ExecutionEvent::from_message(&message));
        Ok(())
    }

    pub(crate) fn emit(&self, event: ExecutionEvent) {
        let record = self.events.borrow_mut().next_record(event);
        if let Some(listener) = self.listener.borrow_mut().as_mut() {
            listener.on_event(&record);
        }
    }

    /// When the newest transaction of an interaction was sent, or first seen
    /// pending by this run.
    pub(crate) fn pending_since(&self, future_id: &str, network_interaction_id: u32) -> Instant {
        *self
            .last_sent
            .borrow_mut()
            .entry((future_id.to_string(), network_interaction_id))
            .or_insert_with(Instant::now)
    }

    pub(crate) fn mark_sent(&self, future_id: &str, network_interaction_id: u32) {
        self.last_sent
            .borrow_mut()
            .insert((future_id.to_string(), network_interaction_id), Instant::now());
    }

    pub(crate) fn into_state(self) -> DeploymentState {
        self.state.into_inner()
    }
}
