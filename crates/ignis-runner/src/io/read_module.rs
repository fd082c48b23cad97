use ignis_core::{build_deployment_module, DeploymentModule, ModuleDefinition, StructuredIssue};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ModuleLoadError {
    #[error("read module failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("module parse failed: {0}")]
    Parse(String),
    #[error("module is invalid: {}", .0.iter().map(|issue| issue.message.as_str()).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<StructuredIssue>),
}

/// Reads a module file and builds it. Problems with the future graph come
/// back as issues, sorted.
pub fn load_deployment_module(path: &Path) -> Result<DeploymentModule, ModuleLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ModuleLoadError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let definition = parse_module_definition(raw.as_str(), path.extension().and_then(|ext| ext.to_str()))?;
    build_deployment_module(definition).map_err(|mut issues| {
        StructuredIssue::sort_stable(&mut issues);
        ModuleLoadError::Invalid(issues)
    })
}

pub fn parse_module_definition(raw: &str, extension: Option<&str>) -> Result<ModuleDefinition, ModuleLoadError> {
    match extension {
        Some("json") => serde_json::from_str(raw)
            .map_err(|error| ModuleLoadError::Parse(format!("json decode error: {error}"))),
        Some("yaml") | Some("yml") => serde_yaml::from_str(raw)
            .map_err(|error| ModuleLoadError::Parse(format!("yaml decode error: {error}"))),
        _ => serde_yaml::from_str(raw)
            .or_else(|_| serde_json::from_str(raw))
            .map_err(|error| ModuleLoadError::Parse(error.to_string())),
    }
}

#[cfg(test)]
#[path = "read_module_test.rs"]
mod tests;
