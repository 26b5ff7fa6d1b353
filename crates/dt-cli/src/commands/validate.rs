use anyhow::{Context, bail};
use dt_core::responses::ValidationOutcome;
use dt_db::undo::UndoManager;

use crate::cli::root_commands::ValidateArgs;
use crate::compose::stdin::{extract_ids, read_and_parse_stdin};
use crate::context::AppContext;
use crate::output;

/// Handle `dtk validate`: one result line per audit entry id.
pub async fn handle(args: &ValidateArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let mut raw_ids = args.ids.clone();
    if args.stdin {
        let input = read_and_parse_stdin()?;
        raw_ids.extend(extract_ids(&input));
    }
    if raw_ids.is_empty() {
        bail!("no audit entry ids given (pass ids or --stdin)");
    }

    let ids = raw_ids
        .iter()
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .with_context(|| format!("invalid audit entry id: {raw}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let manager = UndoManager::new(&ctx.db);
    for id in ids {
        let outcome = match ctx.db.audit_entry(id).await? {
            None => ValidationOutcome::failed(id, None, "audit entry not found"),
            Some(entry) => match manager.validate_undo_safe(&entry).await {
                Ok(()) => ValidationOutcome::passed(&entry),
                Err(error) => ValidationOutcome::failed(id, Some(&entry), error.to_string()),
            },
        };
        output::stream_line(&outcome)?;
    }
    Ok(())
}
