use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::{
    argument_values, collect_future_references, future_reference, parameter_reference, DeploymentModule, Future, FutureKind,
    FutureType, ModuleDefinition,
};
use crate::future_id::{
    to_call_future_id, to_contract_future_id, to_encode_function_call_future_id, to_full_future_id,
    to_read_event_argument_future_id, to_send_data_future_id, module_part,
};
use crate::issues::StructuredIssue;

/// Assigns full ids, rewrites local references to full ids and validates the
/// resulting graph. All problems are reported together.
pub fn build_deployment_module(definition: ModuleDefinition) -> Result<DeploymentModule, Vec<StructuredIssue>> {
    let module_id = definition.id.trim().to_string();
    let mut issues = Vec::new();
    if module_id.is_empty() {
        issues.push(StructuredIssue::error(
            "validation.module_id",
            None,
            "module id must not be empty",
        ));
    } else if module_id.contains(['#', '~', '.']) {
        issues.push(StructuredIssue::error(
            "validation.module_id",
            None,
            format!("module id `{module_id}` must not contain `#`, `~` or `.`"),
        ));
    }

    let mut futures = Vec::with_capacity(definition.futures.len());
    for (index, future_definition) in definition.futures.into_iter().enumerate() {
        let kind = normalize_kind(&module_id, future_definition.kind);
        let Some(id) = assign_id(&module_id, future_definition.id.as_deref(), &kind) else {
            issues.push(
                StructuredIssue::error(
                    "validation.missing_id",
                    None,
                    format!("future #{index} of type {} requires an explicit id", kind.future_type()),
                )
                .with_reference(format!("futures[{index}]")),
            );
            continue;
        };
        let mut dependencies: BTreeSet<String> = future_definition
            .after
            .iter()
            .map(|after| to_full_future_id(&module_id, after))
            .collect();
        dependencies.extend(implicit_dependencies(&kind));
        futures.push(Future {
            id,
            kind,
            dependencies,
        });
    }

    let module = DeploymentModule {
        id: module_id,
        futures,
    };
    issues.extend(validate_module(&module));
    if issues.is_empty() {
        Ok(module)
    } else {
        StructuredIssue::sort_stable(&mut issues);
        Err(issues)
    }
}

fn assign_id(module_id: &str, user_id: Option<&str>, kind: &FutureKind) -> Option<String> {
    let id = match kind {
        FutureKind::ContractDeployment { contract_name, .. } | FutureKind::ContractAt { contract_name, .. } => {
            to_contract_future_id(module_id, user_id, contract_name)
        }
        FutureKind::LibraryDeployment { library_name, .. } => to_contract_future_id(module_id, user_id, library_name),
        FutureKind::ContractCall {
            contract,
            function_name,
            ..
        }
        | FutureKind::StaticCall {
            contract,
            function_name,
            ..
        } => to_call_future_id(module_id, user_id, module_part(contract), contract, function_name),
        FutureKind::EncodeFunctionCall {
            contract,
            function_name,
            ..
        } => to_encode_function_call_future_id(module_id, user_id, module_part(contract), contract, function_name),
        FutureKind::ReadEventArgument {
            future,
            event_name,
            name_or_index,
            event_index,
            emitter,
        } => {
            let emitter = emitter.as_deref().unwrap_or(future);
            let emitter_name = emitter.rsplit_once('#').map_or(emitter, |(_, local)| local);
            to_read_event_argument_future_id(
                module_id,
                user_id,
                emitter_name,
                event_name,
                &name_or_index.to_string(),
                *event_index,
            )
        }
        FutureKind::SendData { .. } => to_send_data_future_id(module_id, user_id?),
    };
    Some(id)
}

fn normalize_kind(module_id: &str, kind: FutureKind) -> FutureKind {
    let full = |id: String| to_full_future_id(module_id, &id);
    let libraries = |libraries: BTreeMap<String, String>| {
        libraries
            .into_iter()
            .map(|(name, id)| (name, to_full_future_id(module_id, &id)))
            .collect()
    };
    let values = |values: Vec<Value>| {
        values
            .into_iter()
            .map(|value| normalize_value(module_id, value))
            .collect()
    };
    match kind {
        FutureKind::ContractDeployment {
            contract_name,
            artifact_id,
            args,
            libraries: linked,
            value,
            from,
        } => FutureKind::ContractDeployment {
            contract_name,
            artifact_id,
            args: values(args),
            libraries: libraries(linked),
            value: value.map(|value| normalize_value(module_id, value)),
            from,
        },
        FutureKind::LibraryDeployment {
            library_name,
            artifact_id,
            libraries: linked,
            from,
        } => FutureKind::LibraryDeployment {
            library_name,
            artifact_id,
            libraries: libraries(linked),
            from,
        },
        FutureKind::ContractAt {
            contract_name,
            artifact_id,
            address,
        } => FutureKind::ContractAt {
            contract_name,
            artifact_id,
            address: normalize_value(module_id, address),
        },
        FutureKind::ContractCall {
            contract,
            function_name,
            args,
            value,
            from,
        } => FutureKind::ContractCall {
            contract: full(contract),
            function_name,
            args: values(args),
            value: value.map(|value| normalize_value(module_id, value)),
            from,
        },
        FutureKind::StaticCall {
            contract,
            function_name,
            args,
            name_or_index,
            from,
        } => FutureKind::StaticCall {
            contract: full(contract),
            function_name,
            args: values(args),
            name_or_index,
            from,
        },
        FutureKind::EncodeFunctionCall {
            contract,
            function_name,
            args,
        } => FutureKind::EncodeFunctionCall {
            contract: full(contract),
            function_name,
            args: values(args),
        },
        FutureKind::ReadEventArgument {
            future,
            event_name,
            name_or_index,
            event_index,
            emitter,
        } => FutureKind::ReadEventArgument {
            future: full(future),
            event_name,
            name_or_index,
            event_index,
            emitter: emitter.map(full),
        },
        FutureKind::SendData { to, data, value, from } => FutureKind::SendData {
            to: normalize_value(module_id, to),
            data,
            value: value.map(|value| normalize_value(module_id, value)),
            from,
        },
    }
}

fn normalize_value(module_id: &str, value: Value) -> Value {
    if let Some(target) = future_reference(&value) {
        return serde_json::json!({ "future": to_full_future_id(module_id, target) });
    }
    if parameter_reference(&value).is_some() {
        return value;
    }
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize_value(module_id, item))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, normalize_value(module_id, item)))
                .collect(),
        ),
        other => other,
    }
}

fn implicit_dependencies(kind: &FutureKind) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();
    for value in argument_values(kind) {
        collect_future_references(value, &mut dependencies);
    }
    match kind {
        FutureKind::ContractDeployment { libraries, .. } | FutureKind::LibraryDeployment { libraries, .. } => {
            dependencies.extend(libraries.values().cloned());
        }
        FutureKind::ContractCall { contract, .. }
        | FutureKind::StaticCall { contract, .. }
        | FutureKind::EncodeFunctionCall { contract, .. } => {
            dependencies.insert(contract.clone());
        }
        FutureKind::ReadEventArgument { future, emitter, .. } => {
            dependencies.insert(future.clone());
            dependencies.extend(emitter.iter().cloned());
        }
        FutureKind::ContractAt { .. } | FutureKind::SendData { .. } => {}
    }
    dependencies
}

fn validate_module(module: &DeploymentModule) -> Vec<StructuredIssue> {
    let mut issues = Vec::new();
    let mut types: BTreeMap<&str, FutureType> = BTreeMap::new();
    for future in &module.futures {
        if types.insert(&future.id, future.future_type()).is_some() {
            issues.push(StructuredIssue::error(
                "validation.duplicate_future",
                Some(&future.id),
                format!("future id `{}` is used more than once", future.id),
            ));
        }
        if matches!(future.artifact_id(), Some(artifact_id) if artifact_id.trim().is_empty()) {
            issues.push(StructuredIssue::error(
                "validation.missing_artifact",
                Some(&future.id),
                "artifact id must not be empty",
            ));
        }
    }

    for future in &module.futures {
        for dependency in &future.dependencies {
            if dependency == &future.id {
                issues.push(StructuredIssue::error(
                    "validation.self_dependency",
                    Some(&future.id),
                    "future depends on itself",
                ));
            } else if !types.contains_key(dependency.as_str()) {
                issues.push(StructuredIssue::error(
                    "validation.unknown_dependency",
                    Some(&future.id),
                    format!("unknown dependency `{dependency}`"),
                ));
            }
        }
        issues.extend(validate_reference_kinds(future, &types));
    }

    if let Some(cycle) = find_cycle_members(module) {
        issues.push(StructuredIssue::error(
            "validation.dependency_cycle",
            None,
            format!("dependency cycle among: {}", cycle.join(", ")),
        ));
    }
    issues
}

fn validate_reference_kinds(future: &Future, types: &BTreeMap<&str, FutureType>) -> Vec<StructuredIssue> {
    let mut issues = Vec::new();
    let mut expect = |target: &str, allowed: &[FutureType], role: &str| {
        if let Some(actual) = types.get(target) {
            if !allowed.contains(actual) {
                issues.push(StructuredIssue::error(
                    "validation.invalid_reference",
                    Some(&future.id),
                    format!("{role} `{target}` is a {actual} future"),
                ));
            }
        }
    };
    let contracts = [
        FutureType::ContractDeployment,
        FutureType::LibraryDeployment,
        FutureType::ContractAt,
    ];
    match &future.kind {
        FutureKind::ContractCall { contract, .. }
        | FutureKind::StaticCall { contract, .. }
        | FutureKind::EncodeFunctionCall { contract, .. } => expect(contract, &contracts, "contract"),
        FutureKind::ContractDeployment { libraries, .. } | FutureKind::LibraryDeployment { libraries, .. } => {
            for library in libraries.values() {
                expect(library, &[FutureType::LibraryDeployment], "library");
            }
        }
        FutureKind::ReadEventArgument { future: source, emitter, .. } => {
            expect(
                source,
                &[
                    FutureType::ContractDeployment,
                    FutureType::LibraryDeployment,
                    FutureType::ContractCall,
                    FutureType::SendData,
                ],
                "event source",
            );
            if let Some(emitter) = emitter {
                expect(emitter, &contracts, "emitter");
            } else if !matches!(
                types.get(source.as_str()),
                Some(FutureType::ContractDeployment | FutureType::LibraryDeployment) | None
            ) {
                issues.push(StructuredIssue::error(
                    "validation.invalid_reference",
                    Some(&future.id),
                    format!("event source `{source}` is not a deployment, an emitter is required"),
                ));
            }
        }
        FutureKind::ContractAt { .. } | FutureKind::SendData { .. } => {}
    }
    issues
}

/// Futures left over after Kahn's algorithm, in declaration order.
fn find_cycle_members(module: &DeploymentModule) -> Option<Vec<String>> {
    let known: BTreeSet<&str> = module.futures.iter().map(|future| future.id.as_str()).collect();
    let mut remaining: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for future in &module.futures {
        let edges = future
            .dependencies
            .iter()
            .filter(|dependency| known.contains(dependency.as_str()) && *dependency != &future.id);
        let mut count = 0;
        for dependency in edges {
            count += 1;
            dependents
                .entry(dependency.as_str())
                .or_default()
                .push(future.id.as_str());
        }
        *remaining.entry(future.id.as_str()).or_insert(0) += count;
    }

    let mut ready: Vec<&str> = remaining
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();
    while let Some(id) = ready.pop() {
        remaining.remove(id);
        for dependent in dependents.get(id).into_iter().flatten() {
            if let Some(count) = remaining.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push(dependent);
                }
            }
        }
    }

    if remaining.is_empty() {
        return None;
    }
    Some(
        module
            .futures
            .iter()
            .filter(|future| remaining.contains_key(future.id.as_str()))
            .map(|future| future.id.clone())
            .collect(),
    )
}
