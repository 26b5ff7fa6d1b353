use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Undo(args) => commands::undo::handle(&args, ctx, flags).await,
        Commands::CanUndo => commands::can_undo::handle(ctx, flags).await,
        Commands::History(args) => commands::history::handle(&args, ctx, flags).await,
        Commands::Validate(args) => commands::validate::handle(&args, ctx).await,
    }
}
