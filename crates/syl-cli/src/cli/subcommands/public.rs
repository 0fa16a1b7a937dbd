use clap::Subcommand;

/// Commands over published syllabi.
#[derive(Clone, Debug, Subcommand)]
pub enum PublicCommands {
    /// List published syllabi.
    List {
        /// Match subject or program code and name, or a syllabus id.
        #[arg(long, visible_alias = "search")]
        query: Option<String>,
    },
    /// A published syllabus with its current version.
    Get { id: i64 },
    /// Subscribe `--as` to a published syllabus.
    Subscribe { id: i64 },
    /// Leave feedback as `--as`.
    Feedback {
        id: i64,
        #[arg(long)]
        content: String,
        /// 1 to 5.
        #[arg(long)]
        rating: Option<u8>,
    },
    /// Feedback left on a syllabus.
    FeedbackList { id: i64 },
}
