use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use syl_config::SylConfig;
use syl_core::identity::Actor;
use syl_db::{SqlStore, SylDb};
use syl_storage::ObjectBlobStore;
use syl_workflow::{Engagement, FileService, FileServiceConfig, SyllabusWorkflow, resolve_actor};

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: SylConfig,
    pub store: Arc<SqlStore>,
    pub workflow: SyllabusWorkflow<SqlStore>,
    pub files: FileService<SqlStore, ObjectBlobStore>,
    pub engagement: Engagement<SqlStore>,
}

impl AppContext {
    pub async fn init(config: SylConfig) -> anyhow::Result<Self> {
        let db = SylDb::from_config(&config.database)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        let store = Arc::new(SqlStore::new(db));
        let blobs = Arc::new(
            ObjectBlobStore::from_config(&config).context("failed to initialize blob store")?,
        );

        Ok(Self {
            workflow: SyllabusWorkflow::new(Arc::clone(&store)),
            files: FileService::new(
                Arc::clone(&store),
                blobs,
                FileServiceConfig::from_config(&config),
            ),
            engagement: Engagement::new(Arc::clone(&store)),
            store,
            config,
        })
    }

    /// The user named by `--as`, with roles read fresh from the store.
    pub async fn actor(&self, flags: &GlobalFlags) -> anyhow::Result<Actor> {
        let user_id = flags
            .acting_user
            .context("this command needs --as <user-id>")?;
        Ok(resolve_actor(&*self.store, user_id).await?)
    }

    pub fn default_url_ttl(&self) -> Duration {
        self.config.storage.default_url_ttl()
    }
}
