use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("ignis")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy").and(predicate::str::contains("wipe")));
}

#[test]
fn batches_prints_waves_for_a_module_file() {
    let dir = temp_dir("batches");
    let module = dir.join("module.json");
    fs::write(
        &module,
        r#"{"id":"Lib","futures":[
            {"type":"library_deployment","library_name":"Math"},
            {"type":"contract_deployment","contract_name":"Calc","libraries":{"Math":"Math"}}
        ]}"#,
    )
    .expect("write module");

    Command::cargo_bin("ignis")
        .expect("binary")
        .args(["batches", "--module"])
        .arg(&module)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Lib#Math""#).and(predicate::str::contains(r#""Lib#Calc""#)));
}

#[test]
fn status_of_missing_journal_fails_with_message() {
    let dir = temp_dir("status");
    Command::cargo_bin("ignis")
        .expect("binary")
        .args(["status", "--journal"])
        .arg(dir.join("journal.jsonl"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("has no recorded deployment"));
}

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ignis-cli-{prefix}-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
