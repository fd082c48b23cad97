use ignis_core::{ExecutionState, ExecutionStatus, StrategyConfig};

/// Strategy and strategy config must be unchanged for futures that will run
/// again. Successful futures are skipped since the strategy is chosen per run.
pub fn reconcile_strategy(
    execution_state: &ExecutionState,
    strategy: &str,
    strategy_config: &StrategyConfig,
) -> Option<String> {
    if execution_state.status() == ExecutionStatus::Success {
        return None;
    }

    let stored = execution_state.base();
    if stored.strategy != strategy {
        return Some(format!(
            "Strategy changed from \"{}\" to \"{strategy}\"",
            stored.strategy
        ));
    }
    if &stored.strategy_config != strategy_config {
        return Some(format!(
            "Strategy config changed from {} to {}",
            config_json(&stored.strategy_config),
            config_json(strategy_config)
        ));
    }
    None
}

fn config_json(config: &StrategyConfig) -> String {
    serde_json::to_string(config).unwrap_or_else(|_| "{}".to_string())
}
