use ignis_core::StructuredIssue;
use serde::{Deserialize, Serialize};

use crate::reconciliation::ReconciliationFutureFailure;
use crate::views::{DeployedContract, FailedFuture, HeldFuture};

/// How a run ended, when it ended without an [`super::EngineError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeploymentResult {
    Success {
        contracts: Vec<DeployedContract>,
    },
    /// At least one future of the last processed batch did not succeed.
    ExecutionError {
        started: Vec<String>,
        timed_out: Vec<String>,
        held: Vec<HeldFuture>,
        failed: Vec<FailedFuture>,
        successful: Vec<String>,
    },
    ReconciliationError {
        failures: Vec<ReconciliationFutureFailure>,
        warnings: Vec<String>,
    },
    ValidationError {
        issues: Vec<StructuredIssue>,
    },
}

impl DeploymentResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
