use std::path::PathBuf;

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["vidforge"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_ideas_generate_defaults() {
    let cli = Cli::try_parse_from(["vidforge", "ideas", "generate"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ideas {
            command: IdeasCommands::Generate {
                count: None,
                output: None,
                dry_run: false
            }
        })
    ));
}

#[test]
fn parses_ideas_generate_with_options() {
    let cli = Cli::try_parse_from([
        "vidforge",
        "ideas",
        "generate",
        "--count",
        "3",
        "--output",
        "out/ideas.json",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ideas {
            command: IdeasCommands::Generate {
                count: Some(3),
                output: Some(ref path),
                dry_run: true
            }
        }) if *path == PathBuf::from("out/ideas.json")
    ));
}

#[test]
fn rejects_non_numeric_count() {
    assert!(Cli::try_parse_from(["vidforge", "ideas", "generate", "--count", "many"]).is_err());
}

#[test]
fn parses_ideas_history_default_limit() {
    let cli = Cli::try_parse_from(["vidforge", "ideas", "history"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ideas {
            command: IdeasCommands::History { limit: 20 }
        })
    ));
}

#[test]
fn parses_ideas_schedule_with_cron() {
    let cli =
        Cli::try_parse_from(["vidforge", "ideas", "schedule", "--cron", "0 30 9 * * *"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ideas {
            command: IdeasCommands::Schedule {
                cron: Some(ref c),
                count: None
            }
        }) if c == "0 30 9 * * *"
    ));
}

#[test]
fn parses_sources_check() {
    let cli = Cli::try_parse_from(["vidforge", "sources", "check"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Sources {
            command: SourcesCommands::Check
        })
    ));
}

#[test]
fn ideas_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["vidforge", "ideas"]).is_err());
}
