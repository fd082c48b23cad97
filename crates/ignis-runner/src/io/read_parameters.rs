use ignis_core::DeploymentParameters;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ParametersLoadError {
    #[error("read parameters failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parameters parse failed: {0}")]
    Parse(String),
}

/// Reads `{ "<module id>" | "$global": { "<name>": value } }` from YAML or
/// JSON.
pub fn load_deployment_parameters(path: &Path) -> Result<DeploymentParameters, ParametersLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ParametersLoadError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(raw.as_str())
            .map_err(|error| ParametersLoadError::Parse(format!("json decode error: {error}"))),
        _ => serde_yaml::from_str(raw.as_str())
            .map_err(|error| ParametersLoadError::Parse(format!("yaml decode error: {error}"))),
    }
}

#[cfg(test)]
#[path = "read_parameters_test.rs"]
mod tests;
