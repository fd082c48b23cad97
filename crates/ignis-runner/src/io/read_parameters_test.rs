use super::{load_deployment_parameters, ParametersLoadError};
use serde_json::json;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ignis-parameters-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    fs::write(&path, content).expect("write temp file");
    path
}

#[test]
fn reads_yaml_and_json_parameter_files() {
    let yaml = temp_file("parameters.yaml", "$global:\n  owner: \"0x01\"\nM:\n  supply: 1000\n");
    let parameters = load_deployment_parameters(&yaml).expect("yaml");
    assert_eq!(parameters["$global"]["owner"], json!("0x01"));
    assert_eq!(parameters["M"]["supply"], json!(1000));

    let json_file = temp_file("parameters.json", r#"{"M": {"tags": ["a", "b"]}}"#);
    let parameters = load_deployment_parameters(&json_file).expect("json");
    assert_eq!(parameters["M"]["tags"], json!(["a", "b"]));
}

#[test]
fn rejects_parameters_not_grouped_by_module() {
    let flat = temp_file("parameters.json", r#"{"owner": "0x01"}"#);
    let error = load_deployment_parameters(&flat).expect_err("flat");
    assert!(matches!(error, ParametersLoadError::Parse(message) if message.starts_with("json decode error")));

    let missing = std::env::temp_dir().join("ignis-parameters-missing/none.yaml");
    assert!(matches!(
        load_deployment_parameters(&missing),
        Err(ParametersLoadError::ReadFile { .. })
    ));
}
