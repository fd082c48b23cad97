use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ignis")]
#[command(about = "Resumable contract deployments driven by a journal")]
pub struct Cli {
    /// Log engine progress at debug level on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Deploy a module, resuming from the journal when it has content.
    Deploy(DeployCommand),
    /// Print the batches the module would run in.
    Batches(BatchesCommand),
    Status(StatusCommand),
    /// Forget the execution state of one future so it runs again.
    Wipe(WipeCommand),
    /// Replay the journal and print the resulting state.
    Journal(JournalCommand),
}

#[derive(Debug, Clone, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DeployCommand {
    #[arg(long)]
    pub module: PathBuf,
    #[arg(long)]
    pub journal: PathBuf,
    #[arg(long)]
    pub config: PathBuf,
    /// Values for the module's parameters, keyed by module id.
    #[arg(long)]
    pub parameters: Option<PathBuf>,
    /// Append progress events as JSONL to this file.
    #[arg(long)]
    pub events_jsonl: Option<PathBuf>,
    #[arg(long)]
    pub run_id: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BatchesCommand {
    #[arg(long)]
    pub module: PathBuf,
    #[arg(long)]
    pub journal: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct StatusCommand {
    #[arg(long)]
    pub journal: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct WipeCommand {
    #[arg(long)]
    pub journal: PathBuf,
    #[arg(long)]
    pub future: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
pub struct JournalCommand {
    #[arg(long)]
    pub journal: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
