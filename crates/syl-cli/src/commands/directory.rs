use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ProgramCommands, SubjectCommands, UserCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `syl user`.
pub async fn handle_user(
    action: &UserCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        UserCommands::Add { email, name, roles } => {
            let user = ctx.store.create_user(email, name, roles).await?;
            output(&user, flags.format)
        }
        UserCommands::Grant { id, role } => {
            let user = ctx.store.grant_role(*id, *role).await?;
            output(&user, flags.format)
        }
        UserCommands::Deactivate { id } => {
            ctx.store.deactivate_user(*id).await?;
            output(&serde_json::json!({ "id": id, "is_active": false }), flags.format)
        }
    }
}

/// Handle `syl subject`.
pub async fn handle_subject(
    action: &SubjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SubjectCommands::Add { code, name } => {
            let subject = ctx.store.create_subject(code, name).await?;
            output(&subject, flags.format)
        }
    }
}

/// Handle `syl program`.
pub async fn handle_program(
    action: &ProgramCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProgramCommands::Add { code, name } => {
            let program = ctx.store.create_program(code, name).await?;
            output(&program, flags.format)
        }
    }
}
