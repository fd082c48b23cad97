use ignis_core::{ExecutionState, Future, FutureKind};
use serde_json::Value;

use crate::resolve::{ResolutionContext, ResolveError};

struct Checks {
    failures: Vec<String>,
}

impl Checks {
    fn new() -> Self {
        Self { failures: Vec::new() }
    }

    fn text(&mut self, label: &str, recorded: &str, current: &str) {
        if recorded != current {
            self.failures
                .push(format!("{label} has been changed from {recorded} to {current}"));
        }
    }

    fn address(&mut self, label: &str, recorded: &str, current: Result<String, ResolveError>) {
        match current {
            Ok(current) if recorded.eq_ignore_ascii_case(&current) => {}
            Ok(current) => self
                .failures
                .push(format!("{label} has been changed from {recorded} to {current}")),
            Err(error) => self.unresolved(label, error),
        }
    }

    fn json(&mut self, label: &str, recorded: &Value, current: Result<Value, ResolveError>) {
        match current {
            Ok(current) if &current == recorded => {}
            Ok(_) => self.failures.push(format!("{label} have been changed")),
            Err(error) => self.unresolved(label, error),
        }
    }

    fn amount(&mut self, recorded: u128, current: Result<u128, ResolveError>) {
        match current {
            Ok(current) if current == recorded => {}
            Ok(current) => self
                .failures
                .push(format!("Value has been changed from {recorded} to {current}")),
            Err(error) => self.unresolved("Value", error),
        }
    }

    fn unresolved(&mut self, label: &str, error: ResolveError) {
        self.failures
            .push(format!("{label} could not be resolved: {error}"));
    }
}

/// Structural comparison of the immutable fields of a recorded future with
/// the module's current definition.
pub(super) fn reconcile_future_fields(
    future: &Future,
    execution_state: &ExecutionState,
    resolution: &ResolutionContext<'_>,
) -> Vec<String> {
    let mut checks = Checks::new();
    match (&future.kind, execution_state) {
        (
            FutureKind::ContractDeployment {
                contract_name,
                args,
                libraries,
                value,
                from,
                ..
            },
            ExecutionState::Deployment(recorded),
        ) => {
            checks.text("Artifact id", &recorded.artifact_id, future.artifact_id().unwrap_or_default());
            checks.text("Contract name", &recorded.contract_name, contract_name);
            checks.json(
                "Constructor args",
                &Value::Array(recorded.constructor_args.clone()),
                resolution.values(args).map(Value::Array),
            );
            checks.json(
                "Libraries",
                &serde_json::to_value(&recorded.libraries).unwrap_or_default(),
                resolution
                    .libraries(libraries)
                    .map(|resolved| serde_json::to_value(resolved).unwrap_or_default()),
            );
            checks.amount(recorded.value, resolution.amount(value.as_ref()));
            checks.address("From account", &recorded.from, resolution.sender(from.as_ref()));
        }
        (
            FutureKind::LibraryDeployment {
                library_name,
                libraries,
                from,
                ..
            },
            ExecutionState::Deployment(recorded),
        ) => {
            checks.text("Artifact id", &recorded.artifact_id, future.artifact_id().unwrap_or_default());
            checks.text("Library name", &recorded.contract_name, library_name);
            checks.json(
                "Libraries",
                &serde_json::to_value(&recorded.libraries).unwrap_or_default(),
                resolution
                    .libraries(libraries)
                    .map(|resolved| serde_json::to_value(resolved).unwrap_or_default()),
            );
            checks.address("From account", &recorded.from, resolution.sender(from.as_ref()));
        }
        (
            FutureKind::ContractCall {
                contract,
                function_name,
                args,
                value,
                from,
            },
            ExecutionState::Call(recorded),
        ) => {
            checks.address("Contract address", &recorded.contract_address, resolution.contract_address(contract));
            checks.text("Function name", &recorded.function_name, function_name);
            checks.json(
                "Function args",
                &Value::Array(recorded.args.clone()),
                resolution.values(args).map(Value::Array),
            );
            checks.amount(recorded.value, resolution.amount(value.as_ref()));
            checks.address("From account", &recorded.from, resolution.sender(from.as_ref()));
        }
        (
            FutureKind::StaticCall {
                contract,
                function_name,
                args,
                name_or_index,
                from,
            },
            ExecutionState::StaticCall(recorded),
        ) => {
            checks.address("Contract address", &recorded.contract_address, resolution.contract_address(contract));
            checks.text("Function name", &recorded.function_name, function_name);
            checks.json(
                "Function args",
                &Value::Array(recorded.args.clone()),
                resolution.values(args).map(Value::Array),
            );
            checks.text(
                "Argument name or index",
                &recorded.name_or_index.to_string(),
                &name_or_index.to_string(),
            );
            checks.address("From account", &recorded.from, resolution.sender(from.as_ref()));
        }
        (
            FutureKind::EncodeFunctionCall {
                function_name, args, ..
            },
            ExecutionState::EncodeFunctionCall(recorded),
        ) => {
            checks.text("Function name", &recorded.function_name, function_name);
            checks.json(
                "Function args",
                &Value::Array(recorded.args.clone()),
                resolution.values(args).map(Value::Array),
            );
        }
        (FutureKind::ContractAt { contract_name, address, .. }, ExecutionState::ContractAt(recorded)) => {
            checks.text("Artifact id", &recorded.artifact_id, future.artifact_id().unwrap_or_default());
            checks.text("Contract name", &recorded.contract_name, contract_name);
            checks.address("Address", &recorded.contract_address, resolution.address(address));
        }
        (
            FutureKind::ReadEventArgument {
                future: source,
                event_name,
                name_or_index,
                event_index,
                emitter,
            },
            ExecutionState::ReadEventArgument(recorded),
        ) => {
            checks.text("Event name", &recorded.event_name, event_name);
            checks.text(
                "Argument name or index",
                &recorded.name_or_index.to_string(),
                &name_or_index.to_string(),
            );
            checks.text("Event index", &recorded.event_index.to_string(), &event_index.to_string());
            checks.address(
                "Emitter",
                &recorded.emitter_address,
                resolution.contract_address(emitter.as_deref().unwrap_or(source)),
            );
        }
        (FutureKind::SendData { to, data, value, from }, ExecutionState::SendData(recorded)) => {
            checks.address("Address \"to\"", &recorded.to, resolution.address(to));
            checks.text("Data", &recorded.data, data.as_deref().unwrap_or("0x"));
            checks.amount(recorded.value, resolution.amount(value.as_ref()));
            checks.address("From account", &recorded.from, resolution.sender(from.as_ref()));
        }
        _ => checks.failures.push(format!(
            "Execution state {} does not match future type {}",
            execution_state.kind_name(),
            future.future_type()
        )),
    }
    checks.failures
}
