use dt_core::entities::AuditLogEntry;
use dt_db::undo::UndoManager;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HistoryArgs;
use crate::compose::stdin::{
    StdinInput, extract_field, extract_ids, extract_paths, read_and_parse_stdin,
};
use crate::context::AppContext;
use crate::output;

#[derive(Debug, Serialize)]
struct HistoryResponse {
    entries: Vec<AuditLogEntry>,
    count: usize,
    skipped: u32,
}

/// Handle `dtk history`.
pub async fn handle(
    args: &HistoryArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let limit = flags.limit.unwrap_or(ctx.config.general.history_limit);
    let manager = UndoManager::new(&ctx.db);

    let history = if args.stdin {
        let input = read_and_parse_stdin()?;
        let keys = entity_keys(&input, args.field.as_deref());
        manager.entity_history(&keys, limit).await?
    } else {
        manager.undo_history(limit).await?
    };

    let response = HistoryResponse {
        count: history.entries.len(),
        entries: history.entries,
        skipped: history.skipped,
    };
    output::success(&response, flags.format)
}

/// Entity keys named by piped items: ids then paths, or one explicit field.
fn entity_keys(input: &StdinInput, field: Option<&str>) -> Vec<String> {
    let mut keys = match field {
        Some(field) => extract_field(input, field),
        None => {
            let mut keys = extract_ids(input);
            keys.extend(extract_paths(input));
            keys
        }
    };
    keys.sort_unstable();
    keys.dedup();
    keys
}
