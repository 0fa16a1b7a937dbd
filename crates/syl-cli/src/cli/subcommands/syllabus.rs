use clap::Subcommand;
use syl_core::enums::WorkflowStatus;

/// Syllabus commands. Transitions act as `--as`.
#[derive(Clone, Debug, Subcommand)]
pub enum SyllabusCommands {
    /// Create a draft with its first version.
    Create {
        #[arg(long)]
        subject: i64,
        #[arg(long)]
        program: i64,
        /// Owning lecturer; defaults to `--as`.
        #[arg(long)]
        owner: Option<i64>,
    },
    /// Change subject or program of a draft.
    Update {
        id: i64,
        #[arg(long)]
        subject: Option<i64>,
        #[arg(long)]
        program: Option<i64>,
    },
    /// Get a syllabus and its current version.
    Get { id: i64 },
    /// List syllabi by status or owner.
    List {
        #[arg(long)]
        status: Option<WorkflowStatus>,
        #[arg(long)]
        owner: Option<i64>,
    },
    /// Audit trail of the current version.
    History { id: i64 },
    /// Submit a draft for review.
    Submit { id: i64 },
    /// Head of department approval.
    HodApprove { id: i64 },
    /// Head of department rejection back to draft.
    HodReject {
        id: i64,
        #[arg(long)]
        reason: String,
    },
    /// Academic affairs approval.
    AaApprove { id: i64 },
    /// Academic affairs rejection back to review.
    AaReject {
        id: i64,
        #[arg(long)]
        reason: String,
    },
    /// Publish an approved syllabus.
    Publish { id: i64 },
    /// Withdraw a published syllabus.
    Unpublish { id: i64 },
}
