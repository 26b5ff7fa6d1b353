use dt_db::undo::{UndoError, UndoManager};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::UndoArgs;
use crate::context::AppContext;
use crate::output;

/// Handle `dtk undo`.
pub async fn handle(args: &UndoArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let manager = UndoManager::new(&ctx.db);

    if args.validate {
        let entry = ctx
            .db
            .last_audit_entry()
            .await
            .map_err(UndoError::from)?
            .ok_or(UndoError::NothingToUndo)?;
        manager.validate_undo_safe(&entry).await?;
    }

    let result = manager.undo().await?;
    output::success(&result, flags.format)
}
