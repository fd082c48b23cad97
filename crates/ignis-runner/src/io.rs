mod read_module;
mod read_parameters;

pub use read_module::{load_deployment_module, parse_module_definition, ModuleLoadError};
pub use read_parameters::{load_deployment_parameters, ParametersLoadError};
