use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `dtk` binary.
#[derive(Debug, Parser)]
#[command(name = "dtk", version, about = "devtrack - undo and inspect tracked changes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, lines
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only on stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides database.path from config)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "dtk", "--format", "lines", "--limit", "5", "--verbose", "history",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Lines);
        assert_eq!(cli.limit, Some(5));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::History(_)));
    }

    #[test]
    fn history_limit_after_subcommand() {
        let cli = Cli::try_parse_from(["dtk", "history", "--limit", "3"]).expect("cli should parse");
        assert_eq!(cli.limit, Some(3));
    }

    #[test]
    fn history_field_requires_stdin() {
        assert!(Cli::try_parse_from(["dtk", "history", "--field", "entity_id"]).is_err());

        let cli = Cli::try_parse_from(["dtk", "history", "--stdin", "--field", "entity_id"])
            .expect("cli should parse");
        match cli.command {
            Commands::History(args) => {
                assert!(args.stdin);
                assert_eq!(args.field.as_deref(), Some("entity_id"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["dtk", "can-undo", "--db", "/tmp/t.db", "--quiet"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.db.as_deref(), Some("/tmp/t.db"));
        assert!(matches!(cli.command, Commands::CanUndo));
    }

    #[test]
    fn undo_validate_flag() {
        let cli = Cli::try_parse_from(["dtk", "undo", "--validate"]).expect("cli should parse");
        match cli.command {
            Commands::Undo(args) => assert!(args.validate),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_ids_and_stdin() {
        let cli = Cli::try_parse_from(["dtk", "validate", "3", "4", "--stdin"])
            .expect("cli should parse");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.ids, vec!["3", "4"]);
                assert!(args.stdin);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["dtk", "--format", "table", "can-undo"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["dtk", "--db", "tracker.db", "can-undo"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.db.as_deref(), Some("tracker.db"));
        assert_eq!(flags.format, OutputFormat::Json);
    }
}
