use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use syl_config::SylConfig;
use syl_db::SylDb;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

const CONFIG_PATH: &str = ".syllabus/config.toml";

#[derive(Serialize)]
struct InitReport {
    config: String,
    config_written: bool,
    database: String,
    blobs: String,
}

/// Handle `syl init`.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config_path = Path::new(CONFIG_PATH);
    let config_written = if config_path.exists() && !args.force {
        tracing::info!(path = CONFIG_PATH, "config exists; keeping it");
        false
    } else {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let rendered = toml::to_string_pretty(&SylConfig::default())
            .context("failed to render default config")?;
        std::fs::write(config_path, rendered)
            .with_context(|| format!("failed to write {CONFIG_PATH}"))?;
        true
    };

    let config = SylConfig::load_with_dotenv()?;
    SylDb::from_config(&config.database)
        .await
        .with_context(|| format!("failed to initialize database at {}", config.database.path))?;
    std::fs::create_dir_all(&config.storage.local_root)
        .with_context(|| format!("failed to create {}", config.storage.local_root))?;

    output(
        &InitReport {
            config: CONFIG_PATH.to_string(),
            config_written,
            database: config.database.path,
            blobs: config.storage.local_root,
        },
        flags.format,
    )
}
