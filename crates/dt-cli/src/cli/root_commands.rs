use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Undo the most recent tracked change.
    Undo(UndoArgs),
    /// Report whether there is a change to undo.
    #[command(name = "can-undo")]
    CanUndo,
    /// List recent audit log entries, newest first (bounded by --limit).
    History(HistoryArgs),
    /// Check that audit entries can still be undone.
    Validate(ValidateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct UndoArgs {
    /// Check that the target still exists before undoing.
    #[arg(long)]
    pub validate: bool,
}

#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// Only entries for entities piped on stdin, matched by id or path.
    #[arg(long)]
    pub stdin: bool,

    /// Take entity keys from this stdin field instead of the id and path aliases.
    #[arg(long, requires = "stdin")]
    pub field: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Audit entry ids to check.
    pub ids: Vec<String>,

    /// Read ids from stdin (JSON array of ids or objects with an id field).
    #[arg(long)]
    pub stdin: bool,
}
