use std::path::{Path, PathBuf};

use ignis_engine::{Artifact, ArtifactError, ArtifactResolver};
use tracing::debug;

/// Loads `<dir>/<artifact_id>.json`, the compiler output format with
/// `contractName`, `abi`, `bytecode` and `linkReferences`.
#[derive(Debug, Clone)]
pub struct FsArtifactResolver {
    dir: PathBuf,
}

impl FsArtifactResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, artifact_id: &str) -> Result<PathBuf, ArtifactError> {
        let escapes = artifact_id.is_empty()
            || artifact_id.contains(['/', '\\'])
            || artifact_id == "."
            || artifact_id == "..";
        if escapes {
            return Err(ArtifactError::Invalid {
                artifact_id: artifact_id.to_string(),
                message: "artifact id must be a plain file name".to_string(),
            });
        }
        Ok(self.dir.join(format!("{artifact_id}.json")))
    }
}

impl ArtifactResolver for FsArtifactResolver {
    fn load_artifact(&self, artifact_id: &str) -> Result<Artifact, ArtifactError> {
        let path = self.path_of(artifact_id)?;
        if !path.is_file() {
            return Err(ArtifactError::NotFound(artifact_id.to_string()));
        }
        debug!(artifact_id, path = %path.display(), "loading artifact");
        let raw = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: Artifact = serde_json::from_str(&raw).map_err(|error| ArtifactError::Invalid {
            artifact_id: artifact_id.to_string(),
            message: error.to_string(),
        })?;
        if !artifact.abi.is_array() {
            return Err(ArtifactError::Invalid {
                artifact_id: artifact_id.to_string(),
                message: "abi must be an array".to_string(),
            });
        }
        Ok(artifact)
    }
}

#[cfg(test)]
#[path = "artifacts_test.rs"]
mod tests;
