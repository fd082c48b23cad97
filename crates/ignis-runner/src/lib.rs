mod cli;
mod config;
mod io;
mod run;

pub use cli::{BatchesCommand, Cli, Commands, DeployCommand, JournalCommand, OutputFormat, StatusCommand, WipeCommand};
pub use config::{
    build_accounts, build_endpoint, engine_options, load_runner_config, parse_runner_config, validate_runner_config,
    ChainConfig, RunnerConfig, RunnerConfigError, RunnerEngineConfig,
};
pub use io::{
    load_deployment_module, load_deployment_parameters, parse_module_definition, ModuleLoadError, ParametersLoadError,
};
pub use run::{execute_batches, execute_deploy, execute_journal, execute_status, execute_wipe, RunnerError};
