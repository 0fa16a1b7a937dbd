use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use syl_workflow::FileUpload;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FileCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `syl file`.
pub async fn handle(action: &FileCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let files = &ctx.files;
    match action {
        FileCommands::Upload {
            version,
            path,
            mime,
            name,
        } => {
            let upload = read_upload(path, mime.as_deref(), name.clone()).await?;
            output(&files.upload_file(&actor, *version, upload).await?, flags.format)
        }
        FileCommands::List { version } => {
            output(&files.list_files_by_version(&actor, *version).await?, flags.format)
        }
        FileCommands::Info { id } => output(&files.get_file_metadata(&actor, *id).await?, flags.format),
        FileCommands::Url { id, ttl } => {
            let ttl = ttl.map_or_else(|| ctx.default_url_ttl(), Duration::from_secs);
            output(&files.signed_url(&actor, *id, ttl).await?, flags.format)
        }
        FileCommands::Rename { id, name } => {
            output(&files.rename_file(&actor, *id, name).await?, flags.format)
        }
        FileCommands::Replace {
            id,
            path,
            mime,
            name,
        } => {
            let upload = read_upload(path, mime.as_deref(), name.clone()).await?;
            output(&files.replace_file(&actor, *id, upload).await?, flags.format)
        }
        FileCommands::Delete { id } => output(&files.delete_file(&actor, *id).await?, flags.format),
    }
}

async fn read_upload(
    path: &Path,
    mime: Option<&str>,
    display_name: Option<String>,
) -> anyhow::Result<FileUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    let mime_type = mime.map_or_else(|| guess_mime(&filename).to_string(), str::to_string);
    Ok(FileUpload {
        bytes,
        filename,
        mime_type,
        display_name,
    })
}

fn guess_mime(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        _ => "application/octet-stream",
    }
}
