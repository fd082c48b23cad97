use clap::Parser;
use ignis_runner::{execute_batches, execute_deploy, execute_journal, execute_status, execute_wipe, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let result = match &cli.command {
        Commands::Deploy(command) => execute_deploy(command),
        Commands::Batches(command) => execute_batches(command),
        Commands::Status(command) => execute_status(command),
        Commands::Wipe(command) => execute_wipe(command),
        Commands::Journal(command) => execute_journal(command),
    };

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
