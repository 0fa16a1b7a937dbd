use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    FileCommands, ProgramCommands, PublicCommands, SubjectCommands, SyllabusCommands, UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the local database, blob directory, and config file.
    Init(InitArgs),
    /// User administration.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Subject catalog.
    Subject {
        #[command(subcommand)]
        action: SubjectCommands,
    },
    /// Program catalog.
    Program {
        #[command(subcommand)]
        action: ProgramCommands,
    },
    /// Syllabus drafting and approval.
    Syllabus {
        #[command(subcommand)]
        action: SyllabusCommands,
    },
    /// Documents attached to a syllabus version.
    File {
        #[command(subcommand)]
        action: FileCommands,
    },
    /// Published syllabi, subscriptions, and feedback.
    Public {
        #[command(subcommand)]
        action: PublicCommands,
    },
    /// Print the JSON schema of an entity.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// One of: syllabus, version, detail, action, file, feedback, subscription, user, signed-url
    pub type_name: String,
}
