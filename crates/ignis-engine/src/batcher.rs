use std::collections::{BTreeMap, BTreeSet};

use ignis_core::{DeploymentModule, DeploymentState, ExecutionStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("future {future_id} depends on unknown future {dependency}")]
    UnknownDependency { future_id: String, dependency: String },
    #[error("dependency cycle among: {}", future_ids.join(", "))]
    Cycle { future_ids: Vec<String> },
}

/// Groups the futures that still need work into waves. Every future lands in
/// the first wave after all of its unfinished dependencies; futures already
/// `SUCCESS` in `state` are left out and count as satisfied.
pub fn batch_futures(module: &DeploymentModule, state: &DeploymentState) -> Result<Vec<Vec<String>>, BatchError> {
    let succeeded = |id: &str| {
        state
            .execution_state(id)
            .is_some_and(|execution_state| execution_state.status() == ExecutionStatus::Success)
    };

    let mut pending = BTreeMap::<&str, BTreeSet<&str>>::new();
    let mut order = Vec::<&str>::new();
    for future in &module.futures {
        if succeeded(&future.id) {
            continue;
        }
        let mut waiting_on = BTreeSet::new();
        for dependency in &future.dependencies {
            if !module.contains(dependency) {
                return Err(BatchError::UnknownDependency {
                    future_id: future.id.clone(),
                    dependency: dependency.clone(),
                });
            }
            if !succeeded(dependency) {
                waiting_on.insert(dependency.as_str());
            }
        }
        pending.insert(future.id.as_str(), waiting_on);
        order.push(future.id.as_str());
    }

    let mut batches = Vec::<Vec<String>>::new();
    let mut done = BTreeSet::<&str>::new();
    while done.len() < order.len() {
        let batch: Vec<&str> = order
            .iter()
            .copied()
            .filter(|id| !done.contains(id))
            .filter(|id| {
                pending
                    .get(id)
                    .is_some_and(|waiting_on| waiting_on.iter().all(|dependency| done.contains(dependency)))
            })
            .collect();
        if batch.is_empty() {
            return Err(BatchError::Cycle {
                future_ids: order
                    .iter()
                    .filter(|id| !done.contains(*id))
                    .map(|id| id.to_string())
                    .collect(),
            });
        }
        done.extend(batch.iter().copied());
        batches.push(batch.into_iter().map(str::to_string).collect());
    }
    Ok(batches)
}

#[cfg(test)]
#[path = "batcher_test.rs"]
mod tests;
