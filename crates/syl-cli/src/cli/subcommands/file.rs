use std::path::PathBuf;

use clap::Subcommand;

/// File commands. Everything acts as `--as`.
#[derive(Clone, Debug, Subcommand)]
pub enum FileCommands {
    /// Upload a document to a draft version.
    Upload {
        version: i64,
        path: PathBuf,
        /// Defaults to a guess from the file extension.
        #[arg(long)]
        mime: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// List files of a version.
    List { version: i64 },
    /// File metadata.
    Info { id: i64 },
    /// Time-limited download link.
    Url {
        id: i64,
        /// Lifetime in seconds; defaults to `storage.default_url_ttl_secs`.
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Change the display name.
    Rename { id: i64, name: String },
    /// Replace the content, keeping the file id.
    Replace {
        id: i64,
        path: PathBuf,
        #[arg(long)]
        mime: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a file and its object.
    Delete { id: i64 },
}
