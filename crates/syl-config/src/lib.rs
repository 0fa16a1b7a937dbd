//! # syl-config
//!
//! Layered configuration loading for the syllabus workspace using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SYLLABUS_*` prefix, `__` as separator)
//! 2. Project-level `.syllabus/config.toml`
//! 3. User-level `~/.config/syllabus/config.toml`
//! 4. Built-in defaults
//!
//! `SYLLABUS_STORAGE__BUCKET` maps to `storage.bucket`,
//! `SYLLABUS_R2__ACCOUNT_ID` to `r2.account_id`, and so on.
//!
//! ```no_run
//! use syl_config::SylConfig;
//!
//! let config = SylConfig::load_with_dotenv().expect("config");
//! println!("database at {}", config.database.path);
//! ```

mod database;
mod error;
mod r2;
mod storage;
mod workflow;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use r2::R2Config;
pub use storage::StorageConfig;
pub use workflow::WorkflowConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "SYLLABUS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SylConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub r2: R2Config,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl SylConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env`; use [`Self::load_with_dotenv`] for that.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.storage.validate()?;
        config.r2.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory (if any), then [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".syllabus/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("syllabus").join("config.toml"))
    }
}
