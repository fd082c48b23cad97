use super::{load_deployment_module, parse_module_definition, ModuleLoadError};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn loads_yaml_module_with_full_future_ids() {
    let path = write_temp_module(
        "module-yaml",
        "module.yaml",
        r#"
id: Token
futures:
  - type: contract_deployment
    contract_name: Token
    args: [1000]
  - type: contract_call
    contract: Token
    function_name: transfer
    args: ["0x0000000000000000000000000000000000000001", 10]
"#,
    );

    let module = load_deployment_module(path.as_path()).expect("module must load");
    assert_eq!(module.id, "Token");
    assert!(module.contains("Token#Token"));
    assert!(module.contains("Token#Token.transfer"));
}

#[test]
fn invalid_graph_is_reported_as_sorted_issues() {
    let path = write_temp_module(
        "module-invalid",
        "module.json",
        r#"{"id":"M","futures":[
            {"type":"contract_deployment","contract_name":"Foo","after":["Missing"]},
            {"type":"contract_deployment","contract_name":"Foo"}
        ]}"#,
    );

    let issues = match load_deployment_module(path.as_path()) {
        Err(ModuleLoadError::Invalid(issues)) => issues,
        other => panic!("expected invalid module, got {other:?}"),
    };
    let kinds = issues.iter().map(|issue| issue.kind.as_str()).collect::<Vec<_>>();
    assert!(kinds.contains(&"validation.duplicate_future"));
    assert!(kinds.contains(&"validation.unknown_dependency"));
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);
}

#[test]
fn unknown_future_type_is_a_parse_error() {
    let error = parse_module_definition(r#"{"id":"M","futures":[{"type":"create3"}]}"#, Some("json"))
        .expect_err("unknown type");
    assert!(matches!(error, ModuleLoadError::Parse(_)));
}

#[test]
fn missing_file_names_the_path() {
    let error = load_deployment_module(std::path::Path::new("/nonexistent/ignis/module.yaml")).expect_err("missing");
    assert!(error.to_string().contains("/nonexistent/ignis/module.yaml"));
}

fn write_temp_module(prefix: &str, name: &str, content: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ignis-runner-{prefix}-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    fs::write(&path, content).expect("write module");
    path
}
