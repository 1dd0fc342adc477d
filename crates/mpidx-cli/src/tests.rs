use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["mpidx-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_parse_command_with_descriptions() {
    let cli = Cli::try_parse_from(["mpidx-cli", "parse", "5 1g nasha", "1 eighth blue dream"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Parse {
            ref descriptions,
            json: false,
            explain: false,
        }) if descriptions.len() == 2 && descriptions[0] == "5 1g nasha"
    ));
}

#[test]
fn parse_flags() {
    let cli = Cli::try_parse_from(["mpidx-cli", "parse", "--json", "--explain", "14g"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Parse {
            json: true,
            explain: true,
            ..
        })
    ));
}

#[test]
fn parse_requires_a_description() {
    assert!(Cli::try_parse_from(["mpidx-cli", "parse"]).is_err());
}

#[test]
fn analytics_update_requires_input() {
    assert!(Cli::try_parse_from(["mpidx-cli", "analytics", "update"]).is_err());
}

#[test]
fn analytics_update_with_input() {
    let cli = Cli::try_parse_from([
        "mpidx-cli",
        "analytics",
        "update",
        "--input",
        "crawl.json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analytics {
            command: AnalyticsCommands::Update {
                ref input,
                dry_run: false
            }
        }) if input.as_os_str() == "crawl.json"
    ));
}

#[test]
fn analytics_update_dry_run() {
    let cli = Cli::try_parse_from([
        "mpidx-cli",
        "analytics",
        "update",
        "--input",
        "crawl.json",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analytics {
            command: AnalyticsCommands::Update { dry_run: true, .. }
        })
    ));
}

#[test]
fn analytics_show_defaults_top_to_none() {
    let cli = Cli::try_parse_from(["mpidx-cli", "analytics", "show"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analytics {
            command: AnalyticsCommands::Show { top: None }
        })
    ));
}

#[test]
fn analytics_show_with_top() {
    let cli = Cli::try_parse_from(["mpidx-cli", "analytics", "show", "--top", "5"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analytics {
            command: AnalyticsCommands::Show { top: Some(5) }
        })
    ));
}

#[test]
fn analytics_show_rejects_non_numeric_top() {
    assert!(Cli::try_parse_from(["mpidx-cli", "analytics", "show", "--top", "many"]).is_err());
}
