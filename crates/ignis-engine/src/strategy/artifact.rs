use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    pub start: usize,
    pub length: usize,
}

/// `source file -> library name -> placeholder positions`, in bytes of the
/// deployment bytecode.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>;

/// The slice of a compiler artifact the engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: Value,
    pub bytecode: String,
    #[serde(default)]
    pub link_references: LinkReferences,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact `{0}` not found")]
    NotFound(String),
    #[error("failed to read artifact `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid artifact `{artifact_id}`: {message}")]
    Invalid { artifact_id: String, message: String },
}

pub trait ArtifactResolver {
    fn load_artifact(&self, artifact_id: &str) -> Result<Artifact, ArtifactError>;
}
