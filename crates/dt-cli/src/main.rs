use anyhow::Context;
use clap::Parser;
use serde_json::{Map, Value};

mod cli;
mod commands;
mod compose;
mod context;
mod output;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        output::error(&format!("{error:#}"), error_details(&error));
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let flags = cli.global_flags();
    init_tracing(flags.quiet, flags.verbose)?;

    let config = load_config(flags.db.as_deref())?;

    let ctx = context::AppContext::init(config).await?;
    let result = commands::dispatch::dispatch(cli.command, &ctx, &flags).await;
    drop(ctx);
    result
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("DEVTRACK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_config(db_override: Option<&str>) -> anyhow::Result<dt_config::DevConfig> {
    let mut config =
        dt_config::DevConfig::load_with_dotenv().context("failed to load devtrack configuration")?;
    if let Some(path) = db_override {
        config.database.path = path.to_string();
        config.validate().context("invalid --db")?;
    }
    Ok(config)
}

/// Machine-readable fields merged into the error envelope.
fn error_details(error: &anyhow::Error) -> Map<String, Value> {
    let mut details = Map::new();
    if let Some(undo) = error.downcast_ref::<dt_db::undo::UndoError>() {
        details.insert("kind".to_string(), Value::from(undo.kind()));
    }
    details
}

#[cfg(test)]
mod tests {
    use dt_db::undo::UndoError;

    use super::error_details;

    #[test]
    fn undo_errors_carry_kind() {
        let error = anyhow::Error::from(UndoError::NothingToUndo);
        let details = error_details(&error);
        assert_eq!(details.get("kind").and_then(|v| v.as_str()), Some("nothing_to_undo"));
    }

    #[test]
    fn other_errors_have_no_details() {
        let error = anyhow::anyhow!("boom");
        assert!(error_details(&error).is_empty());
    }
}
