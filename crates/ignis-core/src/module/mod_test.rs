use serde_json::json;

use super::{build_deployment_module, AccountRef, FutureKind, FutureType, ModuleDefinition, NameOrIndex};

fn definition(value: serde_json::Value) -> ModuleDefinition {
    serde_json::from_value(value).expect("module definition")
}

#[test]
fn builds_ids_and_implicit_dependencies() {
    let module = build_deployment_module(definition(json!({
        "id": "M",
        "futures": [
            {"type": "contract_deployment", "contract_name": "Foo1"},
            {"type": "contract_deployment", "contract_name": "Foo2", "args": [{"future": "Foo1"}]},
            {"type": "contract_call", "contract": "Foo2", "function_name": "init", "from": {"account": 1}},
            {"type": "static_call", "contract": "Foo2", "function_name": "owner", "after": ["M#Foo2.init"]}
        ]
    })))
    .expect("valid module");

    let ids: Vec<&str> = module.futures.iter().map(|future| future.id.as_str()).collect();
    assert_eq!(ids, vec!["M#Foo1", "M#Foo2", "M#Foo2.init", "M#Foo2.owner"]);

    let foo2 = module.future("M#Foo2").expect("foo2");
    assert!(foo2.dependencies.contains("M#Foo1"));
    let FutureKind::ContractDeployment { args, .. } = &foo2.kind else {
        panic!("expected deployment");
    };
    assert_eq!(args[0], json!({"future": "M#Foo1"}));

    let owner = module.future("M#Foo2.owner").expect("static call");
    assert_eq!(owner.future_type(), FutureType::StaticCall);
    assert_eq!(
        owner.dependencies.iter().cloned().collect::<Vec<_>>(),
        vec!["M#Foo2".to_string(), "M#Foo2.init".to_string()]
    );
    let FutureKind::StaticCall { name_or_index, .. } = &owner.kind else {
        panic!("expected static call");
    };
    assert_eq!(name_or_index, &NameOrIndex::Index(0));

    assert_eq!(module.referenced_accounts().into_iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(
        module.future("M#Foo2.init").and_then(|future| future.kind.from_account()),
        Some(&AccountRef::Account { account: 1 })
    );
}

#[test]
fn artifact_defaults_to_contract_name() {
    let module = build_deployment_module(definition(json!({
        "id": "M",
        "futures": [
            {"type": "library_deployment", "library_name": "Lib"},
            {"type": "contract_deployment", "contract_name": "Foo", "artifact_id": "FooV2", "libraries": {"Lib": "Lib"}},
            {"type": "encode_function_call", "contract": "Foo", "function_name": "f"}
        ]
    })))
    .expect("valid module");

    assert_eq!(module.future("M#Lib").and_then(|future| future.artifact_id()), Some("Lib"));
    assert_eq!(module.future("M#Foo").and_then(|future| future.artifact_id()), Some("FooV2"));
    assert!(module.future("M#Foo").expect("foo").dependencies.contains("M#Lib"));
    assert!(module.contains("M#encodeFunctionCall(Foo.f)"));
}

#[test]
fn reports_graph_problems_together() {
    let issues = build_deployment_module(definition(json!({
        "id": "M",
        "futures": [
            {"type": "contract_deployment", "contract_name": "A", "after": ["B"]},
            {"type": "contract_deployment", "contract_name": "B", "after": ["A"]},
            {"type": "contract_deployment", "contract_name": "B"},
            {"type": "contract_deployment", "contract_name": "C", "after": ["Missing", "C"]},
            {"type": "send_data", "to": "0x0000000000000000000000000000000000000001"}
        ]
    })))
    .expect_err("invalid module");

    let kinds: Vec<&str> = issues.iter().map(|issue| issue.kind.as_str()).collect();
    assert!(kinds.contains(&"validation.duplicate_future"));
    assert!(kinds.contains(&"validation.unknown_dependency"));
    assert!(kinds.contains(&"validation.self_dependency"));
    assert!(kinds.contains(&"validation.missing_id"));
    let cycle = issues
        .iter()
        .find(|issue| issue.kind == "validation.dependency_cycle")
        .expect("cycle issue");
    assert!(cycle.message.contains("M#A"));
}

#[test]
fn rejects_calls_on_non_contract_futures() {
    let issues = build_deployment_module(definition(json!({
        "id": "M",
        "futures": [
            {"type": "send_data", "id": "fund", "to": "0x0000000000000000000000000000000000000001"},
            {"type": "contract_call", "contract": "fund", "function_name": "f"}
        ]
    })))
    .expect_err("invalid module");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "validation.invalid_reference");
    assert_eq!(issues[0].future_id.as_deref(), Some("M#fund.f"));
}
