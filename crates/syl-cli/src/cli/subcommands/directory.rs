use clap::Subcommand;
use syl_core::enums::Role;

/// User administration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create an active user.
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Role to grant; repeat for several.
        #[arg(long = "role", required = true)]
        roles: Vec<Role>,
    },
    /// Grant an extra role.
    Grant {
        id: i64,
        #[arg(long)]
        role: Role,
    },
    /// Mark a user inactive.
    Deactivate { id: i64 },
}

#[derive(Clone, Debug, Subcommand)]
pub enum SubjectCommands {
    /// Add a subject.
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Clone, Debug, Subcommand)]
pub enum ProgramCommands {
    /// Add a program.
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
    },
}
