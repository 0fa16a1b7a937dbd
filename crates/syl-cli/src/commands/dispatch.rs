use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::User { action } => commands::directory::handle_user(&action, ctx, flags).await,
        Commands::Subject { action } => commands::directory::handle_subject(&action, ctx, flags).await,
        Commands::Program { action } => commands::directory::handle_program(&action, ctx, flags).await,
        Commands::Syllabus { action } => commands::syllabus::handle(&action, ctx, flags).await,
        Commands::File { action } => commands::file::handle(&action, ctx, flags).await,
        Commands::Public { action } => commands::public::handle(&action, ctx, flags).await,
        Commands::Init(_) | Commands::Schema(_) => {
            unreachable!("init/schema are pre-dispatched in main")
        }
    }
}
