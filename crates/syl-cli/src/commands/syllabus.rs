use syl_core::entities::DraftUpdate;
use syl_core::enums::Role;
use syl_core::identity::Actor;
use syl_workflow::WorkflowError;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SyllabusCommands;
use crate::context::AppContext;
use crate::output::output;

/// Lecturers draft for themselves; only an admin drafts on someone's behalf.
fn draft_owner(actor: &Actor, requested: Option<i64>) -> Result<i64, WorkflowError> {
    let owner = requested.unwrap_or(actor.user_id);
    let allowed = if owner == actor.user_id {
        actor.has_role(Role::Lecturer)
    } else {
        actor.has_role(Role::Admin)
    };
    if allowed {
        Ok(owner)
    } else {
        tracing::warn!(actor = actor.user_id, owner, "draft creation denied");
        Err(WorkflowError::Unauthorized)
    }
}

/// Handle `syl syllabus`. Every subcommand runs as `--as`.
pub async fn handle(
    action: &SyllabusCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let workflow = &ctx.workflow;
    let actor = ctx.actor(flags).await?;
    match action {
        SyllabusCommands::Create {
            subject,
            program,
            owner,
        } => {
            let owner = draft_owner(&actor, *owner)?;
            let detail = workflow.create_draft(*subject, *program, owner).await?;
            output(&detail, flags.format)
        }
        SyllabusCommands::Update {
            id,
            subject,
            program,
        } => {
            let update = DraftUpdate {
                subject_id: *subject,
                program_id: *program,
            };
            let syllabus = workflow
                .update_draft(*id, Some(actor.user_id), update)
                .await?;
            output(&syllabus, flags.format)
        }
        SyllabusCommands::Get { id } => output(&workflow.get_detail(*id).await?, flags.format),
        SyllabusCommands::List { status, owner } => {
            let mut syllabi = match (status, owner) {
                (Some(status), _) => workflow.list_by_status(*status).await?,
                (None, Some(owner)) => workflow.list_by_owner(*owner).await?,
                (None, None) => anyhow::bail!("syllabus list needs --status or --owner"),
            };
            if let (Some(_), Some(owner)) = (status, owner) {
                syllabi.retain(|s| s.owner_lecturer_id == *owner);
            }
            output(&syllabi, flags.format)
        }
        SyllabusCommands::History { id } => output(&workflow.history(*id).await?, flags.format),
        SyllabusCommands::Submit { id } => {
            output(&workflow.submit_for_review(*id, &actor).await?, flags.format)
        }
        SyllabusCommands::HodApprove { id } => {
            output(&workflow.hod_approve(*id, &actor).await?, flags.format)
        }
        SyllabusCommands::HodReject { id, reason } => {
            output(&workflow.hod_reject(*id, &actor, reason).await?, flags.format)
        }
        SyllabusCommands::AaApprove { id } => {
            output(&workflow.aa_approve(*id, &actor).await?, flags.format)
        }
        SyllabusCommands::AaReject { id, reason } => {
            output(&workflow.aa_reject(*id, &actor, reason).await?, flags.format)
        }
        SyllabusCommands::Publish { id } => {
            output(&workflow.publish(*id, &actor).await?, flags.format)
        }
        SyllabusCommands::Unpublish { id } => {
            output(&workflow.unpublish(*id, &actor).await?, flags.format)
        }
    }
}
