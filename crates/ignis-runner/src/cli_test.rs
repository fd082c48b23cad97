use super::{Cli, Commands, OutputFormat};
use clap::{CommandFactory, Parser};
use std::path::Path;

#[test]
fn cli_help_lists_every_command() {
    let mut command = Cli::command();
    let help = command.render_long_help().to_string();
    for name in ["deploy", "batches", "status", "wipe", "journal"] {
        assert!(help.contains(name), "help must mention `{name}`");
    }
}

#[test]
fn cli_parses_deploy_with_events_and_json_output() {
    let cli = Cli::try_parse_from([
        "ignis",
        "deploy",
        "--module",
        "module.yaml",
        "--journal",
        "journal.jsonl",
        "--config",
        "ignis.yaml",
        "--parameters",
        "parameters.yaml",
        "--events-jsonl",
        "events.jsonl",
        "--format",
        "json",
        "--verbose",
    ])
    .expect("deploy must parse");
    assert!(cli.verbose);
    match cli.command {
        Commands::Deploy(command) => {
            assert_eq!(command.module, Path::new("module.yaml"));
            assert_eq!(command.journal, Path::new("journal.jsonl"));
            assert_eq!(command.config, Path::new("ignis.yaml"));
            assert_eq!(command.parameters.as_deref(), Some(Path::new("parameters.yaml")));
            assert_eq!(command.events_jsonl.as_deref(), Some(Path::new("events.jsonl")));
            assert_eq!(command.run_id, None);
            assert_eq!(command.format, OutputFormat::Json);
        }
        _ => panic!("expected deploy"),
    }
}

#[test]
fn cli_deploy_requires_a_config() {
    let error = Cli::try_parse_from(["ignis", "deploy", "--module", "m.yaml", "--journal", "j.jsonl"])
        .expect_err("config is required");
    assert!(error.to_string().contains("--config"));
}

#[test]
fn cli_parses_batches_without_journal() {
    let cli = Cli::try_parse_from(["ignis", "batches", "--module", "module.json"]).expect("batches must parse");
    match cli.command {
        Commands::Batches(command) => {
            assert_eq!(command.journal, None);
            assert_eq!(command.format, OutputFormat::Text);
        }
        _ => panic!("expected batches"),
    }
}

#[test]
fn cli_parses_wipe_future() {
    let cli = Cli::try_parse_from(["ignis", "wipe", "--journal", "j.jsonl", "--future", "M#Foo"])
        .expect("wipe must parse");
    match cli.command {
        Commands::Wipe(command) => assert_eq!(command.future, "M#Foo"),
        _ => panic!("expected wipe"),
    }
}

#[test]
fn cli_rejects_unknown_format() {
    assert!(Cli::try_parse_from(["ignis", "status", "--journal", "j.jsonl", "--format", "xml"]).is_err());
}
