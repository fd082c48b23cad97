use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::execution_state::ExecutionState;

/// Chain id of a deployment that has not been initialized yet.
pub const UNINITIALIZED_CHAIN_ID: i64 = -1;

/// Immutable snapshot of a deployment. Cloning is cheap: execution states
/// are shared and only copied when a reduction changes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentState {
    pub chain_id: i64,
    pub execution_states: BTreeMap<String, Arc<ExecutionState>>,
}

impl Default for DeploymentState {
    fn default() -> Self {
        Self {
            chain_id: UNINITIALIZED_CHAIN_ID,
            execution_states: BTreeMap::new(),
        }
    }
}

impl DeploymentState {
    pub fn is_initialized(&self) -> bool {
        self.chain_id != UNINITIALIZED_CHAIN_ID
    }

    pub fn execution_state(&self, future_id: &str) -> Option<&ExecutionState> {
        self.execution_states.get(future_id).map(Arc::as_ref)
    }

    /// Mutable access that copies the state first if a snapshot still
    /// shares it.
    pub fn execution_state_mut(&mut self, future_id: &str) -> Option<&mut ExecutionState> {
        self.execution_states.get_mut(future_id).map(Arc::make_mut)
    }
}
