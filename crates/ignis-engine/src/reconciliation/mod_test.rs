use std::collections::BTreeSet;

use ignis_core::{
    build_deployment_module, DeploymentModule, DeploymentState, ModuleDefinition, ModuleParameters, StrategyConfig,
    StrategyConfigValue,
};
use serde_json::{json, Value};

use super::{reconcile, ReconciliationContext, ReconciliationResult};
use crate::reducer::replay;
use crate::test_support::*;

fn module(futures: Value) -> DeploymentModule {
    let definition: ModuleDefinition =
        serde_json::from_value(json!({ "id": "M", "futures": futures })).expect("definition");
    build_deployment_module(definition).expect("module")
}

fn foo_module() -> DeploymentModule {
    module(json!([{"type": "contract_deployment", "contract_name": "Foo"}]))
}

fn started_foo() -> DeploymentState {
    replay(&[initialize(31337), deployment_init("M#Foo", "Foo")]).expect("state")
}

fn run(module: &DeploymentModule, state: &DeploymentState, strategy: &str, config: &StrategyConfig) -> ReconciliationResult {
    let accounts = vec![SENDER.to_string(), OTHER_SENDER.to_string()];
    reconcile(&ReconciliationContext {
        module,
        state,
        accounts: &accounts,
        default_sender: SENDER,
        strategy,
        strategy_config: config,
        parameters: &ModuleParameters::new(),
    })
}

#[test]
fn unchanged_module_is_compatible() {
    let result = run(&foo_module(), &started_foo(), "basic", &StrategyConfig::new());
    assert!(result.is_compatible(), "{result:?}");
    assert!(result.missing_executed_futures.is_empty());
}

#[test]
fn strategy_change_names_both_strategies() {
    let result = run(&foo_module(), &started_foo(), "create2", &StrategyConfig::new());

    assert!(!result.is_compatible());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].future_id, "M#Foo");
    let message = &result.failures[0].failures[0];
    assert!(message.contains("basic"), "{message}");
    assert!(message.contains("create2"), "{message}");
}

#[test]
fn strategy_config_change_is_reported() {
    let config = StrategyConfig::from([("salt".to_string(), StrategyConfigValue::Text("0x01".to_string()))]);
    let result = run(&foo_module(), &started_foo(), "basic", &config);

    assert_eq!(
        result.failures[0].failures,
        vec!["Strategy config changed from {} to {\"salt\":\"0x01\"}".to_string()]
    );
}

#[test]
fn successful_futures_are_never_reconciled() {
    let state = replay(&successful_deployment_journal("M#Foo", "0x01")).expect("state");
    let changed = module(json!([{
        "type": "contract_deployment",
        "contract_name": "Bar",
        "id": "Foo",
        "args": [1, 2],
        "from": {"account": 1}
    }]));
    let config = StrategyConfig::from([("salt".to_string(), StrategyConfigValue::Number(1.into()))]);

    let result = run(&changed, &state, "create2", &config);
    assert!(result.is_compatible(), "{result:?}");
}

#[test]
fn changed_fields_are_aggregated_per_future() {
    let changed = module(json!([{
        "type": "contract_deployment",
        "contract_name": "Foo",
        "artifact_id": "FooV2",
        "args": [42],
        "value": "7",
        "from": {"account": 1}
    }]));

    let result = run(&changed, &started_foo(), "basic", &StrategyConfig::new());

    assert_eq!(result.failures.len(), 1);
    let failures = &result.failures[0].failures;
    assert_eq!(failures.len(), 4, "{failures:?}");
    assert!(failures[0].starts_with("Artifact id has been changed from Foo to FooV2"));
    assert_eq!(failures[1], "Constructor args have been changed");
    assert_eq!(failures[2], "Value has been changed from 0 to 7");
    assert!(failures[3].contains(OTHER_SENDER));
}

#[test]
fn sender_comparison_ignores_address_case() {
    let upper = format!("0x{}", SENDER[2..].to_ascii_uppercase());
    let changed = module(json!([{"type": "contract_deployment", "contract_name": "Foo", "from": upper}]));

    let result = run(&changed, &started_foo(), "basic", &StrategyConfig::new());
    assert!(result.is_compatible(), "{result:?}");
}

#[test]
fn future_type_change_is_reported_alone() {
    let changed = module(json!([{
        "type": "contract_at",
        "id": "Foo",
        "contract_name": "Foo",
        "address": "0x00000000000000000000000000000000000000aa"
    }]));

    let result = run(&changed, &started_foo(), "create2", &StrategyConfig::new());
    assert_eq!(
        result.failures[0].failures,
        vec!["Future with id M#Foo has changed from CONTRACT_DEPLOYMENT to CONTRACT_AT".to_string()]
    );
}

#[test]
fn removed_futures_are_warnings_only() {
    let state = replay(&[
        initialize(31337),
        deployment_init("M#Foo", "Foo"),
        deployment_init("M#Old", "Old"),
    ])
    .expect("state");

    let result = run(&foo_module(), &state, "basic", &StrategyConfig::new());

    assert!(result.is_compatible());
    assert_eq!(result.missing_executed_futures, vec!["M#Old".to_string()]);
    let issues = result.to_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "reconciliation.missing_future");
    assert!(!ignis_core::StructuredIssue::has_errors(&issues));
}

#[test]
fn dependency_added_before_it_completed_is_incompatible() {
    let state = replay(&[
        initialize(31337),
        deployment_init("M#Foo", "Foo"),
        deployment_init_with("M#Bar", "Bar", "basic", BTreeSet::new()),
    ])
    .expect("state");
    let changed = module(json!([
        {"type": "contract_deployment", "contract_name": "Foo"},
        {"type": "contract_deployment", "contract_name": "Bar", "after": ["Foo"]}
    ]));

    let result = run(&changed, &state, "basic", &StrategyConfig::new());

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].future_id, "M#Bar");
    assert!(result.failures[0].failures[0].starts_with("A dependency from M#Bar to M#Foo has been added"));
}

#[test]
fn dependency_added_after_it_completed_is_accepted() {
    let mut journal = successful_deployment_journal("M#Foo", "0x01");
    journal.push(deployment_init("M#Bar", "Bar"));
    let state = replay(&journal).expect("state");
    let changed = module(json!([
        {"type": "contract_deployment", "contract_name": "Foo"},
        {"type": "contract_deployment", "contract_name": "Bar", "after": ["Foo"]}
    ]));

    let result = run(&changed, &state, "basic", &StrategyConfig::new());
    assert!(result.is_compatible(), "{result:?}");
}
