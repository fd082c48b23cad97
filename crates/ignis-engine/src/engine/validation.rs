use ignis_core::{
    AccountRef, DeploymentModule, DeploymentState, ExecutionStatus, Future, FutureKind, ModuleParameters,
    StructuredIssue,
};

use crate::strategy::{AbiCodec, Artifact, ArtifactResolver, CodecError};

/// Checks that need the chain's accounts, the parameters, the artifacts or
/// their ABI, complementing the structural checks done when the module is
/// built. Futures that already succeeded are skipped.
pub(crate) fn validate_module(
    module: &DeploymentModule,
    state: &DeploymentState,
    accounts: &[String],
    parameters: &ModuleParameters,
    artifacts: &dyn ArtifactResolver,
    codec: &dyn AbiCodec,
) -> Vec<StructuredIssue> {
    let mut issues = Vec::new();

    for index in module.referenced_accounts() {
        if index >= accounts.len() {
            issues.push(StructuredIssue::error(
                "validation.account_out_of_range",
                None,
                format!("account index {index} is out of range, {} accounts available", accounts.len()),
            ));
        }
    }

    for future in &module.futures {
        let done = state
            .execution_state(&future.id)
            .is_some_and(|execution_state| execution_state.status() == ExecutionStatus::Success);
        if done {
            continue;
        }

        issues.extend(validate_parameters(future, parameters));

        if let Some(AccountRef::Address(address)) = future.kind.from_account() {
            if !accounts.iter().any(|account| account.eq_ignore_ascii_case(address)) {
                issues.push(StructuredIssue::error(
                    "validation.unknown_sender",
                    Some(&future.id),
                    format!("sender {address} is not one of the accounts of the chain client"),
                ));
            }
        }

        if let Some(artifact_id) = future.artifact_id() {
            match artifacts.load_artifact(artifact_id) {
                Ok(artifact) => {
                    if let FutureKind::ContractDeployment { args, .. } = &future.kind {
                        if let Err(error) = codec.check_constructor(&artifact, args.len()) {
                            issues.push(abi_issue(future, error));
                        }
                    }
                }
                Err(error) => issues.push(
                    StructuredIssue::error("validation.invalid_artifact", Some(&future.id), error.to_string())
                        .with_reference(artifact_id),
                ),
            }
        }

        if let Some(issue) = validate_abi_usage(module, future, artifacts, codec) {
            issues.push(issue);
        }
    }

    StructuredIssue::sort_stable(&mut issues);
    issues
}

fn validate_parameters(future: &Future, parameters: &ModuleParameters) -> Vec<StructuredIssue> {
    let mut issues = Vec::new();
    for usage in future.parameter_uses() {
        match parameters.get(usage.name).or(usage.default) {
            None => issues.push(
                StructuredIssue::error(
                    "validation.missing_module_parameter",
                    Some(&future.id),
                    format!("module parameter `{}` requires a value but was given none", usage.name),
                )
                .with_reference(usage.name),
            ),
            Some(value) if !usage.expected.accepts(value) => issues.push(
                StructuredIssue::error(
                    "validation.invalid_module_parameter_type",
                    Some(&future.id),
                    format!("module parameter `{}` must be {}, got {value}", usage.name, usage.expected),
                )
                .with_reference(usage.name),
            ),
            Some(_) => {}
        }
    }
    issues
}

/// Function and event usage of calls and event reads against the ABI of the
/// contract they target. Artifacts that fail to load are reported on the
/// contract future itself.
fn validate_abi_usage(
    module: &DeploymentModule,
    future: &Future,
    artifacts: &dyn ArtifactResolver,
    codec: &dyn AbiCodec,
) -> Option<StructuredIssue> {
    let target_artifact = |contract: &str| -> Option<Artifact> {
        let artifact_id = module.future(contract)?.artifact_id()?;
        artifacts.load_artifact(artifact_id).ok()
    };
    let checked = match &future.kind {
        FutureKind::ContractCall {
            contract,
            function_name,
            args,
            ..
        }
        | FutureKind::EncodeFunctionCall {
            contract,
            function_name,
            args,
        } => target_artifact(contract).map(|artifact| codec.check_function(&artifact, function_name, args.len(), None)),
        FutureKind::StaticCall {
            contract,
            function_name,
            args,
            name_or_index,
            ..
        } => target_artifact(contract)
            .map(|artifact| codec.check_function(&artifact, function_name, args.len(), Some(name_or_index))),
        FutureKind::ReadEventArgument {
            future: source,
            event_name,
            name_or_index,
            emitter,
            ..
        } => target_artifact(emitter.as_deref().unwrap_or(source))
            .map(|artifact| codec.check_event_argument(&artifact, event_name, name_or_index)),
        _ => None,
    };
    match checked {
        Some(Err(error)) => Some(abi_issue(future, error)),
        _ => None,
    }
}

fn abi_issue(future: &Future, error: CodecError) -> StructuredIssue {
    let kind = match &error {
        CodecError::UnknownFunction { .. } => "validation.unknown_function",
        CodecError::ArgumentCount { .. } => "validation.argument_count",
        CodecError::UnknownOutput { .. } => "validation.unknown_output",
        CodecError::UnknownEvent { .. } => "validation.unknown_event",
        _ => "validation.invalid_abi",
    };
    StructuredIssue::error(kind, Some(&future.id), error.to_string())
}
