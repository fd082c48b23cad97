//! Checks a resumed run against what the journal already recorded.
//!
//! Futures that already succeeded are never reconciled. Every other
//! recorded future must still describe the same operation, with the same
//! strategy, or the run halts before anything is written.

mod future_fields;
mod strategy;

use std::collections::BTreeSet;

use ignis_core::{
    DeploymentModule, DeploymentState, ExecutionStatus, ModuleParameters, StrategyConfig, StructuredIssue,
};
use serde::{Deserialize, Serialize};

use crate::resolve::ResolutionContext;

pub use strategy::reconcile_strategy;

pub struct ReconciliationContext<'a> {
    pub module: &'a DeploymentModule,
    pub state: &'a DeploymentState,
    pub accounts: &'a [String],
    pub default_sender: &'a str,
    pub strategy: &'a str,
    pub strategy_config: &'a StrategyConfig,
    pub parameters: &'a ModuleParameters,
}

/// Every incompatibility found for one future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationFutureFailure {
    pub future_id: String,
    pub failures: Vec<String>,
}

impl std::fmt::Display for ReconciliationFutureFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.future_id, self.failures.join("; "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub failures: Vec<ReconciliationFutureFailure>,
    /// Recorded futures that are no longer part of the module.
    pub missing_executed_futures: Vec<String>,
}

impl ReconciliationResult {
    pub fn is_compatible(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.missing_executed_futures
            .iter()
            .map(|future_id| format!("{future_id} has been removed from the module but was already executed"))
            .collect()
    }

    pub fn to_issues(&self) -> Vec<StructuredIssue> {
        let mut issues: Vec<StructuredIssue> = self
            .failures
            .iter()
            .flat_map(|failure| {
                failure
                    .failures
                    .iter()
                    .map(|message| StructuredIssue::error("reconciliation", Some(&failure.future_id), message.clone()))
            })
            .collect();
        issues.extend(
            self.missing_executed_futures
                .iter()
                .zip(self.warnings())
                .map(|(future_id, message)| StructuredIssue::warning("reconciliation.missing_future", Some(future_id), message)),
        );
        StructuredIssue::sort_stable(&mut issues);
        issues
    }
}

pub fn reconcile(context: &ReconciliationContext<'_>) -> ReconciliationResult {
    let resolution = ResolutionContext::new(context.module, context.state, context.accounts, context.default_sender)
        .with_parameters(context.parameters);
    let mut failures = Vec::new();

    for future in &context.module.futures {
        let Some(execution_state) = context.state.execution_state(&future.id) else {
            continue;
        };
        if execution_state.status() == ExecutionStatus::Success {
            continue;
        }

        let mut messages = Vec::new();
        if execution_state.base().future_type != future.future_type() {
            messages.push(format!(
                "Future with id {} has changed from {} to {}",
                future.id,
                execution_state.base().future_type,
                future.future_type()
            ));
        } else {
            messages.extend(reconcile_strategy(execution_state, context.strategy, context.strategy_config));
            messages.extend(future_fields::reconcile_future_fields(future, execution_state, &resolution));
            messages.extend(reconcile_dependencies(future, execution_state, context.state));
        }

        if !messages.is_empty() {
            failures.push(ReconciliationFutureFailure {
                future_id: future.id.clone(),
                failures: messages,
            });
        }
    }

    let missing_executed_futures = context
        .state
        .execution_states
        .keys()
        .filter(|future_id| !context.module.contains(future_id))
        .cloned()
        .collect();

    ReconciliationResult {
        failures,
        missing_executed_futures,
    }
}

/// A dependency added after the future started must already be complete,
/// otherwise the future ran before something it now depends on.
fn reconcile_dependencies(
    future: &ignis_core::Future,
    execution_state: &ignis_core::ExecutionState,
    state: &DeploymentState,
) -> Vec<String> {
    let recorded: &BTreeSet<String> = &execution_state.base().dependencies;
    future
        .dependencies
        .difference(recorded)
        .filter(|dependency| {
            state
                .execution_state(dependency)
                .map_or(true, |dependency_state| dependency_state.status() != ExecutionStatus::Success)
        })
        .map(|dependency| {
            format!(
                "A dependency from {} to {dependency} has been added. The former has started executing before the latter started executing, so this change is incompatible.",
                future.id
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
