//! Syllabi, their versions, and the workflow audit trail.

use chrono::{DateTime, Utc};
use libsql::Connection;

use syl_core::entities::{
    NewSyllabus, NewWorkflowAction, Syllabus, SyllabusVersion, WorkflowAction,
};
use syl_core::enums::WorkflowStatus;
use syl_core::repository::{RepositoryError, SyllabusRepository};

use crate::SqlTransaction;
use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, get_unsigned, parse_datetime, parse_optional_datetime, parse_stored,
    returning_id,
};

const SYLLABUS_COLS: &str =
    "id, subject_id, program_id, owner_lecturer_id, current_version_id, lifecycle_status, created_at";

const VERSION_COLS: &str = "id, syllabus_id, academic_year, version_no, workflow_status, \
     submitted_at, approved_at, published_at, created_by, created_at";

const ACTION_COLS: &str =
    "id, version_id, actor_user_id, action_type, from_status, to_status, note, acted_at";

fn row_to_syllabus(row: &libsql::Row) -> Result<Syllabus, DatabaseError> {
    Ok(Syllabus {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        program_id: row.get(2)?,
        owner_lecturer_id: row.get(3)?,
        current_version_id: row.get::<Option<i64>>(4)?,
        lifecycle_status: parse_stored("syllabi.lifecycle_status", &row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn row_to_version(row: &libsql::Row) -> Result<SyllabusVersion, DatabaseError> {
    Ok(SyllabusVersion {
        id: row.get(0)?,
        syllabus_id: row.get(1)?,
        academic_year: row.get(2)?,
        version_no: get_unsigned(row, 3, "syllabus_versions.version_no")?,
        workflow_status: parse_stored(
            "syllabus_versions.workflow_status",
            &row.get::<String>(4)?,
        )?,
        submitted_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        approved_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        published_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        created_by: row.get(8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

fn row_to_action(row: &libsql::Row) -> Result<WorkflowAction, DatabaseError> {
    Ok(WorkflowAction {
        id: row.get(0)?,
        version_id: row.get(1)?,
        actor_user_id: row.get(2)?,
        action_type: parse_stored("workflow_actions.action_type", &row.get::<String>(3)?)?,
        from_status: parse_stored("workflow_actions.from_status", &row.get::<String>(4)?)?,
        to_status: parse_stored("workflow_actions.to_status", &row.get::<String>(5)?)?,
        note: get_opt_string(row, 6)?,
        acted_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn opt_rfc3339(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(|t| t.to_rfc3339())
}

pub async fn get_syllabus(conn: &Connection, id: i64) -> Result<Option<Syllabus>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SYLLABUS_COLS} FROM syllabi WHERE id = ?1"),
            [id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_syllabus(&row)).transpose()
}

pub async fn insert_syllabus(conn: &Connection, new: &NewSyllabus) -> Result<Syllabus, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO syllabi (subject_id, program_id, owner_lecturer_id, lifecycle_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
            libsql::params![
                new.subject_id,
                new.program_id,
                new.owner_lecturer_id,
                WorkflowStatus::Draft.as_str(),
                new.created_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(Syllabus {
        id: returning_id(rows).await?,
        subject_id: new.subject_id,
        program_id: new.program_id,
        owner_lecturer_id: new.owner_lecturer_id,
        current_version_id: None,
        lifecycle_status: WorkflowStatus::Draft,
        created_at: new.created_at,
    })
}

pub async fn update_syllabus(conn: &Connection, syllabus: &Syllabus) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE syllabi SET subject_id = ?1, program_id = ?2, current_version_id = ?3
             WHERE id = ?4",
            libsql::params![
                syllabus.subject_id,
                syllabus.program_id,
                syllabus.current_version_id,
                syllabus.id
            ],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

pub async fn insert_initial_version(
    conn: &Connection,
    syllabus_id: i64,
    created_by: i64,
    created_at: DateTime<Utc>,
) -> Result<SyllabusVersion, DatabaseError> {
    let academic_year = SyllabusVersion::academic_year_for(created_at);
    let rows = conn
        .query(
            "INSERT INTO syllabus_versions
                 (syllabus_id, academic_year, version_no, workflow_status, created_by, created_at)
             VALUES (?1, ?2, 1, ?3, ?4, ?5) RETURNING id",
            libsql::params![
                syllabus_id,
                academic_year.as_str(),
                WorkflowStatus::Draft.as_str(),
                created_by,
                created_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(SyllabusVersion {
        id: returning_id(rows).await?,
        syllabus_id,
        academic_year,
        version_no: 1,
        workflow_status: WorkflowStatus::Draft,
        submitted_at: None,
        approved_at: None,
        published_at: None,
        created_by,
        created_at,
    })
}

pub async fn get_version(conn: &Connection, id: i64) -> Result<Option<SyllabusVersion>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {VERSION_COLS} FROM syllabus_versions WHERE id = ?1"),
            [id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_version(&row)).transpose()
}

pub async fn update_version(conn: &Connection, version: &SyllabusVersion) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE syllabus_versions
             SET workflow_status = ?1, submitted_at = ?2, approved_at = ?3, published_at = ?4
             WHERE id = ?5",
            libsql::params![
                version.workflow_status.as_str(),
                opt_rfc3339(version.submitted_at),
                opt_rfc3339(version.approved_at),
                opt_rfc3339(version.published_at),
                version.id
            ],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

/// Conditional status write. Zero affected rows means another writer moved
/// the syllabus first (or it does not exist).
pub async fn transition_status(
    conn: &Connection,
    syllabus_id: i64,
    expected: WorkflowStatus,
    next: WorkflowStatus,
) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE syllabi SET lifecycle_status = ?1 WHERE id = ?2 AND lifecycle_status = ?3",
            libsql::params![next.as_str(), syllabus_id, expected.as_str()],
        )
        .await?;
    Ok(changed == 1)
}

async fn list_where(
    conn: &Connection,
    clause: &str,
    param: libsql::Value,
) -> Result<Vec<Syllabus>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SYLLABUS_COLS} FROM syllabi WHERE {clause} ORDER BY id"),
            vec![param],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_syllabus(&row)?);
    }
    Ok(out)
}

pub async fn insert_action(
    conn: &Connection,
    action: &NewWorkflowAction,
) -> Result<WorkflowAction, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO workflow_actions
                 (version_id, actor_user_id, action_type, from_status, to_status, note, acted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id",
            libsql::params![
                action.version_id,
                action.actor_user_id,
                action.action_type.as_str(),
                action.from_status.as_str(),
                action.to_status.as_str(),
                action.note.clone(),
                action.acted_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(WorkflowAction {
        id: returning_id(rows).await?,
        version_id: action.version_id,
        actor_user_id: action.actor_user_id,
        action_type: action.action_type,
        from_status: action.from_status,
        to_status: action.to_status,
        note: action.note.clone(),
        acted_at: action.acted_at,
    })
}

pub async fn list_actions(conn: &Connection, version_id: i64) -> Result<Vec<WorkflowAction>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {ACTION_COLS} FROM workflow_actions WHERE version_id = ?1 ORDER BY acted_at, id"
            ),
            [version_id],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_action(&row)?);
    }
    Ok(out)
}

impl SyllabusRepository for SqlTransaction {
    async fn get_syllabus(&mut self, id: i64) -> Result<Option<Syllabus>, RepositoryError> {
        Ok(get_syllabus(&self.tx, id).await?)
    }

    async fn add_syllabus(&mut self, new: NewSyllabus) -> Result<Syllabus, RepositoryError> {
        Ok(insert_syllabus(&self.tx, &new).await?)
    }

    async fn update_syllabus(&mut self, syllabus: &Syllabus) -> Result<(), RepositoryError> {
        Ok(update_syllabus(&self.tx, syllabus).await?)
    }

    async fn create_initial_version(
        &mut self,
        syllabus_id: i64,
        created_by: i64,
        created_at: DateTime<Utc>,
    ) -> Result<SyllabusVersion, RepositoryError> {
        Ok(insert_initial_version(&self.tx, syllabus_id, created_by, created_at).await?)
    }

    async fn get_version(&mut self, id: i64) -> Result<Option<SyllabusVersion>, RepositoryError> {
        Ok(get_version(&self.tx, id).await?)
    }

    async fn update_version(&mut self, version: &SyllabusVersion) -> Result<(), RepositoryError> {
        Ok(update_version(&self.tx, version).await?)
    }

    async fn transition_status(
        &mut self,
        syllabus_id: i64,
        expected: WorkflowStatus,
        next: WorkflowStatus,
    ) -> Result<bool, RepositoryError> {
        Ok(transition_status(&self.tx, syllabus_id, expected, next).await?)
    }

    async fn list_by_status(
        &mut self,
        status: WorkflowStatus,
    ) -> Result<Vec<Syllabus>, RepositoryError> {
        Ok(list_where(&self.tx, "lifecycle_status = ?1", status.as_str().into()).await?)
    }

    async fn list_by_owner(&mut self, owner_id: i64) -> Result<Vec<Syllabus>, RepositoryError> {
        Ok(list_where(&self.tx, "owner_lecturer_id = ?1", owner_id.into()).await?)
    }

    async fn append_action(
        &mut self,
        action: NewWorkflowAction,
    ) -> Result<WorkflowAction, RepositoryError> {
        Ok(insert_action(&self.tx, &action).await?)
    }

    async fn list_actions(
        &mut self,
        version_id: i64,
    ) -> Result<Vec<WorkflowAction>, RepositoryError> {
        Ok(list_actions(&self.tx, version_id).await?)
    }
}
