use ignis_runner::Cli;
use clap::CommandFactory;

#[test]
fn help_smoke_lists_core_subcommands() {
    let mut command = Cli::command();
    let help = command.render_long_help().to_string();
    assert!(help.contains("deploy"));
    assert!(help.contains("status"));
    assert!(help.contains("--verbose"));
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
