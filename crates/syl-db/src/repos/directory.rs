//! Users, roles, subjects, programs.

use chrono::{DateTime, Utc};
use libsql::Connection;

use syl_core::entities::{Program, Subject, User};
use syl_core::enums::Role;
use syl_core::repository::{DirectoryRepository, RepositoryError};

use crate::SqlTransaction;
use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_stored, returning_id};

const USER_COLS: &str = "id, email, full_name, is_active, created_at";

fn row_to_user(row: &libsql::Row, roles: Vec<Role>) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        is_active: row.get::<i64>(3)? != 0,
        roles,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub async fn get_user(conn: &Connection, user_id: i64) -> Result<Option<User>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
            [user_id],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    let roles = user_roles(conn, user_id).await?;
    Ok(Some(row_to_user(&row, roles)?))
}

pub async fn user_roles(conn: &Connection, user_id: i64) -> Result<Vec<Role>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT role FROM user_roles WHERE user_id = ?1",
            [user_id],
        )
        .await?;
    let mut roles = Vec::new();
    while let Some(row) = rows.next().await? {
        roles.push(parse_stored::<Role>("user_roles.role", &row.get::<String>(0)?)?);
    }
    roles.sort();
    Ok(roles)
}

async fn exists(conn: &Connection, table: &str, id: i64) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id])
        .await?;
    Ok(rows.next().await?.is_some())
}

pub async fn insert_user(
    conn: &Connection,
    email: &str,
    full_name: &str,
    roles: &[Role],
    created_at: DateTime<Utc>,
) -> Result<User, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO users (email, full_name, is_active, created_at)
             VALUES (?1, ?2, 1, ?3) RETURNING id",
            libsql::params![email, full_name, created_at.to_rfc3339()],
        )
        .await?;
    let id = returning_id(rows).await?;
    for role in roles {
        insert_role(conn, id, *role).await?;
    }
    let mut roles = roles.to_vec();
    roles.sort();
    roles.dedup();
    Ok(User {
        id,
        email: email.to_string(),
        full_name: full_name.to_string(),
        is_active: true,
        roles,
        created_at,
    })
}

pub async fn insert_role(conn: &Connection, user_id: i64, role: Role) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
        libsql::params![user_id, role.as_str()],
    )
    .await?;
    Ok(())
}

pub async fn set_active(conn: &Connection, user_id: i64, active: bool) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE users SET is_active = ?1 WHERE id = ?2",
            libsql::params![i64::from(active), user_id],
        )
        .await?;
    Ok(changed > 0)
}

pub async fn insert_subject(conn: &Connection, code: &str, name: &str) -> Result<Subject, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO subjects (code, name) VALUES (?1, ?2) RETURNING id",
            libsql::params![code, name],
        )
        .await?;
    Ok(Subject {
        id: returning_id(rows).await?,
        code: code.to_string(),
        name: name.to_string(),
    })
}

pub async fn insert_program(conn: &Connection, code: &str, name: &str) -> Result<Program, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO programs (code, name) VALUES (?1, ?2) RETURNING id",
            libsql::params![code, name],
        )
        .await?;
    Ok(Program {
        id: returning_id(rows).await?,
        code: code.to_string(),
        name: name.to_string(),
    })
}

async fn code_and_name(
    conn: &Connection,
    table: &str,
    id: i64,
) -> Result<Option<(String, String)>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT code, name FROM {table} WHERE id = ?1"), [id])
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    Ok(Some((row.get(0)?, row.get(1)?)))
}

pub async fn get_subject(conn: &Connection, id: i64) -> Result<Option<Subject>, DatabaseError> {
    Ok(code_and_name(conn, "subjects", id)
        .await?
        .map(|(code, name)| Subject { id, code, name }))
}

pub async fn get_program(conn: &Connection, id: i64) -> Result<Option<Program>, DatabaseError> {
    Ok(code_and_name(conn, "programs", id)
        .await?
        .map(|(code, name)| Program { id, code, name }))
}

impl DirectoryRepository for SqlTransaction {
    async fn get_user(&mut self, user_id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(get_user(&self.tx, user_id).await?)
    }

    async fn user_roles(&mut self, user_id: i64) -> Result<Vec<Role>, RepositoryError> {
        Ok(user_roles(&self.tx, user_id).await?)
    }

    async fn user_exists(&mut self, user_id: i64) -> Result<bool, RepositoryError> {
        Ok(exists(&self.tx, "users", user_id).await?)
    }

    async fn subject_exists(&mut self, subject_id: i64) -> Result<bool, RepositoryError> {
        Ok(exists(&self.tx, "subjects", subject_id).await?)
    }

    async fn program_exists(&mut self, program_id: i64) -> Result<bool, RepositoryError> {
        Ok(exists(&self.tx, "programs", program_id).await?)
    }

    async fn get_subject(&mut self, subject_id: i64) -> Result<Option<Subject>, RepositoryError> {
        Ok(get_subject(&self.tx, subject_id).await?)
    }

    async fn get_program(&mut self, program_id: i64) -> Result<Option<Program>, RepositoryError> {
        Ok(get_program(&self.tx, program_id).await?)
    }
}
