use dt_core::responses::CanUndoResponse;
use dt_db::undo::UndoManager;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output;

/// Handle `dtk can-undo`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let can_undo = UndoManager::new(&ctx.db).can_undo().await?;
    output::success(&CanUndoResponse { can_undo }, flags.format)
}
