use crate::cli::GlobalFlags;
use crate::cli::subcommands::PublicCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `syl public`.
pub async fn handle(action: &PublicCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engagement = &ctx.engagement;
    match action {
        PublicCommands::List { query } => output(
            &engagement.list_published(query.as_deref()).await?,
            flags.format,
        ),
        PublicCommands::Get { id } => output(&engagement.get_published(*id).await?, flags.format),
        PublicCommands::Subscribe { id } => {
            let actor = ctx.actor(flags).await?;
            output(&engagement.subscribe(*id, actor.user_id).await?, flags.format)
        }
        PublicCommands::Feedback {
            id,
            content,
            rating,
        } => {
            let actor = ctx.actor(flags).await?;
            let feedback = engagement
                .submit_feedback(*id, actor.user_id, content, *rating)
                .await?;
            output(&feedback, flags.format)
        }
        PublicCommands::FeedbackList { id } => {
            output(&engagement.list_feedback(*id).await?, flags.format)
        }
    }
}
