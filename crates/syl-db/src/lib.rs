//! # syl-db
//!
//! libSQL persistence for syllabus lifecycle state.
//!
//! [`SylDb`] owns the database handle and runs migrations. [`SqlStore`]
//! wraps it and implements the repository traits from `syl-core`: every
//! engine operation runs inside one [`SqlTransaction`], and transactions are
//! serialized by a write gate so a status check and its conditional update
//! cannot interleave with another writer.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::DatabaseError;
pub use store::{SqlStore, SqlTransaction};

use libsql::Builder;
use syl_config::DatabaseConfig;

/// Database handle with one long-lived connection.
///
/// A single connection is shared by every transaction; for `:memory:`
/// databases a second connection would see an empty database.
pub struct SylDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl SylDb {
    /// Open a local database at `path`, creating parent directories.
    ///
    /// Runs migrations automatically on every open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:"
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Query(format!("create {}: {e}", parent.display()))
            })?;
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let syl_db = Self { db, conn };
        syl_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(syl_db)
    }

    /// Open the database named by the `[database]` config section.
    ///
    /// # Errors
    ///
    /// Same as [`Self::open_local`].
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::open_local(&config.path).await
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
