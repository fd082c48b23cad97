use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ignis_engine::{ArtifactError, ArtifactResolver};
use serde_json::json;

use super::FsArtifactResolver;

fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock ok")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("ignis-artifacts-{label}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create dir");
    dir
}

#[test]
fn loads_compiler_artifacts() {
    let dir = temp_dir("ok");
    std::fs::write(
        dir.join("Token.json"),
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": "Token",
            "sourceName": "contracts/Token.sol",
            "abi": [],
            "bytecode": "0x6080",
            "deployedBytecode": "0x6080",
            "linkReferences": {"contracts/Lib.sol": {"Lib": [{"start": 1, "length": 20}]}}
        })
        .to_string(),
    )
    .expect("write artifact");

    let artifact = FsArtifactResolver::new(&dir).load_artifact("Token").expect("artifact");

    assert_eq!(artifact.contract_name, "Token");
    assert_eq!(artifact.bytecode, "0x6080");
    assert_eq!(artifact.link_references["contracts/Lib.sol"]["Lib"][0].length, 20);
}

#[test]
fn missing_and_malformed_artifacts_are_errors() {
    let dir = temp_dir("errors");
    std::fs::write(dir.join("Broken.json"), "{\"contractName\": 1}").expect("write artifact");
    let resolver = FsArtifactResolver::new(&dir);

    assert!(matches!(resolver.load_artifact("Missing"), Err(ArtifactError::NotFound(id)) if id == "Missing"));
    assert!(matches!(resolver.load_artifact("Broken"), Err(ArtifactError::Invalid { .. })));
    assert!(matches!(resolver.load_artifact("../Token"), Err(ArtifactError::Invalid { .. })));
}
