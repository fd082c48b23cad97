use super::{execute_batches, execute_deploy, execute_journal, execute_status, execute_wipe, RunnerError};
use crate::cli::{BatchesCommand, DeployCommand, JournalCommand, OutputFormat, StatusCommand, WipeCommand};
use ignis_core::{
    DeploymentExecutionStateCompleteMessage, DeploymentExecutionStateInitializeMessage, DeploymentInitializeMessage,
    DeploymentSuccess, ExecutionResult, FutureType, JournalMessage, StrategyConfig,
};
use ignis_engine::{FileJournal, Journal};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const SENDER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const MODULE: &str = r#"
id: M
futures:
  - type: contract_deployment
    contract_name: Foo1
  - type: contract_deployment
    contract_name: Foo2
    args: [{ future: Foo1 }]
  - type: contract_call
    contract: Foo2
    function_name: setup
"#;

#[test]
fn batches_text_lists_waves_in_order() {
    let dir = temp_dir("batches-text");
    let module = write(&dir, "module.yaml", MODULE);

    let output = execute_batches(&BatchesCommand {
        module,
        journal: None,
        format: OutputFormat::Text,
    })
    .expect("batches must succeed");

    assert_eq!(
        output,
        "Ignis batches\nmodule: M\nbatch 1: M#Foo1\nbatch 2: M#Foo2\nbatch 3: M#Foo2.setup"
    );
}

#[test]
fn batches_skip_futures_the_journal_already_completed() {
    let dir = temp_dir("batches-journal");
    let module = write(&dir, "module.yaml", MODULE);
    let journal = dir.join("journal.jsonl");
    record(&journal, &partially_deployed());

    let output = execute_batches(&BatchesCommand {
        module,
        journal: Some(journal),
        format: OutputFormat::Json,
    })
    .expect("batches must succeed");

    let parsed: Value = serde_json::from_str(output.as_str()).expect("json");
    assert_eq!(parsed["module_id"], "M");
    assert_eq!(
        parsed["batches"],
        serde_json::json!([["M#Foo2"], ["M#Foo2.setup"]])
    );
}

#[test]
fn status_reports_successful_and_started_futures() {
    let dir = temp_dir("status");
    let journal = dir.join("journal.jsonl");
    record(&journal, &partially_deployed());

    let text = execute_status(&StatusCommand {
        journal: journal.clone(),
        format: OutputFormat::Text,
    })
    .expect("status text");
    assert!(text.contains("chain_id: 31337"));
    assert!(text.contains("complete: false"));
    assert!(text.contains("successful: M#Foo1"));
    assert!(text.contains("started: M#Foo2"));
    assert!(text.contains("M#Foo1 (Foo1): 0x00000000000000000000000000000000000000f1"));

    let json = execute_status(&StatusCommand {
        journal,
        format: OutputFormat::Json,
    })
    .expect("status json");
    let parsed: Value = serde_json::from_str(json.as_str()).expect("json");
    assert_eq!(parsed["complete"], false);
    assert_eq!(parsed["status"]["started"], serde_json::json!(["M#Foo2"]));
}

#[test]
fn status_of_an_empty_journal_is_an_error() {
    let dir = temp_dir("status-empty");
    let error = execute_status(&StatusCommand {
        journal: dir.join("missing.jsonl"),
        format: OutputFormat::Text,
    })
    .expect_err("nothing recorded");
    assert!(matches!(error, RunnerError::EmptyJournal { .. }));
}

#[test]
fn wipe_refuses_futures_with_dependents_then_wipes_the_leaf() {
    let dir = temp_dir("wipe");
    let journal = dir.join("journal.jsonl");
    record(&journal, &partially_deployed());

    let error = execute_wipe(&WipeCommand {
        journal: journal.clone(),
        future: "M#Foo1".to_string(),
        format: OutputFormat::Text,
    })
    .expect_err("M#Foo2 depends on M#Foo1");
    assert!(error.to_string().contains("M#Foo2"));

    let output = execute_wipe(&WipeCommand {
        journal: journal.clone(),
        future: "M#Foo2".to_string(),
        format: OutputFormat::Json,
    })
    .expect("leaf wipe");
    let parsed: Value = serde_json::from_str(output.as_str()).expect("json");
    assert_eq!(parsed["wiped"], "M#Foo2");
    assert_eq!(parsed["remaining"], serde_json::json!(["M#Foo1"]));

    let messages = FileJournal::new(&journal).read_all().expect("journal");
    assert_eq!(messages.len(), 5);
    assert_eq!(messages.last().map(JournalMessage::message_type), Some("WIPE_APPLY"));
}

#[test]
fn journal_replays_into_a_readable_state() {
    let dir = temp_dir("journal");
    let journal = dir.join("journal.jsonl");
    record(&journal, &partially_deployed());

    let text = execute_journal(&JournalCommand {
        journal: journal.clone(),
        format: OutputFormat::Text,
    })
    .expect("journal text");
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines[..3], ["Ignis journal", "chain_id: 31337", "messages: 4"]);
    assert!(lines[3].starts_with("M#Foo1 "));
    assert!(lines[3].contains("Success"));
    assert!(lines[4].starts_with("M#Foo2 "));
    assert!(lines[4].contains("Started"));

    let json = execute_journal(&JournalCommand {
        journal,
        format: OutputFormat::Json,
    })
    .expect("journal json");
    let parsed: Value = serde_json::from_str(json.as_str()).expect("json");
    assert_eq!(parsed["messages"], 4);
    assert_eq!(parsed["state"]["chain_id"], 31337);
    assert!(parsed["state"]["execution_states"]["M#Foo1"].is_object());
}

#[test]
fn deploy_fails_on_an_invalid_module_before_reading_config() {
    let dir = temp_dir("deploy-invalid");
    let module = write(
        &dir,
        "module.json",
        r#"{"id":"M","futures":[{"type":"contract_deployment","contract_name":"Foo","after":["Nope"]}]}"#,
    );

    let error = execute_deploy(&DeployCommand {
        module,
        journal: dir.join("journal.jsonl"),
        config: dir.join("missing-config.yaml"),
        parameters: None,
        events_jsonl: None,
        run_id: None,
        format: OutputFormat::Text,
    })
    .expect_err("invalid module");
    assert!(matches!(error, RunnerError::Module(_)));
    assert!(!dir.join("journal.jsonl").exists());
}

#[test]
fn deploy_reports_config_problems_without_connecting() {
    let dir = temp_dir("deploy-config");
    let module = write(&dir, "module.yaml", MODULE);
    let config = write(&dir, "ignis.yaml", "chain:\n  rpc_url: http://127.0.0.1:1\n  accounts: []\n");

    let error = execute_deploy(&DeployCommand {
        module,
        journal: dir.join("journal.jsonl"),
        config,
        parameters: None,
        events_jsonl: None,
        run_id: None,
        format: OutputFormat::Text,
    })
    .expect_err("no accounts");
    assert!(matches!(error, RunnerError::Config(_)));
    assert!(error.to_string().contains("chain.accounts"));
}

#[test]
fn deploy_reads_the_parameters_file_before_connecting() {
    let dir = temp_dir("deploy-parameters");
    let module = write(&dir, "module.yaml", MODULE);
    let parameters = write(&dir, "parameters.json", r#"{"owner": "0x01"}"#);

    let error = execute_deploy(&DeployCommand {
        module,
        journal: dir.join("journal.jsonl"),
        config: dir.join("missing-config.yaml"),
        parameters: Some(parameters),
        events_jsonl: None,
        run_id: None,
        format: OutputFormat::Text,
    })
    .expect_err("parameters are not grouped by module");
    assert!(matches!(error, RunnerError::Parameters(_)));
    assert!(!dir.join("journal.jsonl").exists());
}

fn partially_deployed() -> Vec<JournalMessage> {
    vec![
        JournalMessage::DeploymentInitialize(DeploymentInitializeMessage { chain_id: 31337 }),
        deployment_init("M#Foo1", "Foo1", BTreeSet::new()),
        JournalMessage::DeploymentExecutionStateComplete(DeploymentExecutionStateCompleteMessage {
            future_id: "M#Foo1".to_string(),
            result: ExecutionResult::Success(DeploymentSuccess {
                address: "0x00000000000000000000000000000000000000f1".to_string(),
            }),
        }),
        deployment_init("M#Foo2", "Foo2", BTreeSet::from(["M#Foo1".to_string()])),
    ]
}

fn deployment_init(future_id: &str, contract_name: &str, dependencies: BTreeSet<String>) -> JournalMessage {
    JournalMessage::DeploymentExecutionStateInitialize(DeploymentExecutionStateInitializeMessage {
        future_id: future_id.to_string(),
        future_type: FutureType::ContractDeployment,
        strategy: "basic".to_string(),
        strategy_config: StrategyConfig::new(),
        dependencies,
        artifact_id: contract_name.to_string(),
        contract_name: contract_name.to_string(),
        constructor_args: Vec::new(),
        libraries: BTreeMap::new(),
        value: 0,
        from: SENDER.to_string(),
    })
}

fn record(path: &std::path::Path, messages: &[JournalMessage]) {
    let mut journal = FileJournal::new(path);
    for message in messages {
        journal.append(message).expect("append");
    }
}

fn write(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write temp file");
    path
}

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ignis-runner-{prefix}-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
