//! Transactional store over [`SylDb`].

use std::sync::Arc;

use chrono::Utc;
use syl_core::entities::{Program, Subject, User};
use syl_core::enums::Role;
use syl_core::repository::{RepositoryError, StoreTransaction, SyllabusStore};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::DatabaseError;
use crate::repos::directory;
use crate::SylDb;

/// [`SyllabusStore`] backed by libSQL.
///
/// Holds the write gate: `begin` waits until no other transaction from
/// this store is open.
pub struct SqlStore {
    db: SylDb,
    write_gate: Arc<Mutex<()>>,
}

/// An open libSQL transaction plus the write gate it holds.
///
/// Dropping it without calling `commit` rolls back.
pub struct SqlTransaction {
    pub(crate) tx: libsql::Transaction,
    _gate: OwnedMutexGuard<()>,
}

impl SqlStore {
    #[must_use]
    pub fn new(db: SylDb) -> Self {
        Self {
            db,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Open (and migrate) a local database and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Ok(Self::new(SylDb::open_local(path).await?))
    }

    #[must_use]
    pub const fn db(&self) -> &SylDb {
        &self.db
    }

    async fn begin_tx(&self) -> Result<SqlTransaction, DatabaseError> {
        let gate = Arc::clone(&self.write_gate).lock_owned().await;
        let tx = self.db.conn().transaction().await?;
        Ok(SqlTransaction { tx, _gate: gate })
    }

    // -----------------------------------------------------------------------
    // Directory administration (seeding; not part of the workflow surface)
    // -----------------------------------------------------------------------

    /// Create an active user holding `roles`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on constraint violations (duplicate email).
    pub async fn create_user(
        &self,
        email: &str,
        full_name: &str,
        roles: &[Role],
    ) -> Result<User, DatabaseError> {
        let tx = self.begin_tx().await?;
        let user = directory::insert_user(&tx.tx, email, full_name, roles, Utc::now()).await?;
        tx.tx.commit().await?;
        tracing::info!(user_id = user.id, email, "user created");
        Ok(user)
    }

    /// Add `role` to an existing user. Granting a held role is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown user.
    pub async fn grant_role(&self, user_id: i64, role: Role) -> Result<User, DatabaseError> {
        let tx = self.begin_tx().await?;
        directory::insert_role(&tx.tx, user_id, role).await?;
        let user = directory::get_user(&tx.tx, user_id)
            .await?
            .ok_or(DatabaseError::NoResult)?;
        tx.tx.commit().await?;
        tracing::info!(user_id, role = %role, "role granted");
        Ok(user)
    }

    /// Mark a user inactive. Inactive users cannot act.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown user.
    pub async fn deactivate_user(&self, user_id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin_tx().await?;
        let changed = directory::set_active(&tx.tx, user_id, false).await?;
        if !changed {
            return Err(DatabaseError::NoResult);
        }
        tx.tx.commit().await?;
        tracing::info!(user_id, "user deactivated");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` on a duplicate code.
    pub async fn create_subject(&self, code: &str, name: &str) -> Result<Subject, DatabaseError> {
        let tx = self.begin_tx().await?;
        let subject = directory::insert_subject(&tx.tx, code, name).await?;
        tx.tx.commit().await?;
        Ok(subject)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` on a duplicate code.
    pub async fn create_program(&self, code: &str, name: &str) -> Result<Program, DatabaseError> {
        let tx = self.begin_tx().await?;
        let program = directory::insert_program(&tx.tx, code, name).await?;
        tx.tx.commit().await?;
        Ok(program)
    }
}

impl SyllabusStore for SqlStore {
    type Tx = SqlTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        Ok(self.begin_tx().await?)
    }
}

impl StoreTransaction for SqlTransaction {
    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(DatabaseError::from)?;
        Ok(())
    }
}
