//! Subscriptions and feedback on published syllabi.

use chrono::{DateTime, Utc};
use libsql::Connection;

use syl_core::entities::{Feedback, NewFeedback, Subscription};
use syl_core::repository::{EngagementRepository, RepositoryError};

use crate::SqlTransaction;
use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, returning_id};

const SUBSCRIPTION_COLS: &str = "id, user_id, syllabus_id, created_at";

const FEEDBACK_COLS: &str =
    "id, syllabus_id, version_id, author_user_id, rating, content, created_at";

fn row_to_subscription(row: &libsql::Row) -> Result<Subscription, DatabaseError> {
    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        syllabus_id: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

fn row_to_feedback(row: &libsql::Row) -> Result<Feedback, DatabaseError> {
    let rating = row
        .get::<Option<i64>>(4)?
        .map(|r| {
            u8::try_from(r)
                .map_err(|_| DatabaseError::InvalidState(format!("feedback.rating: {r} out of range")))
        })
        .transpose()?;
    Ok(Feedback {
        id: row.get(0)?,
        syllabus_id: row.get(1)?,
        version_id: row.get(2)?,
        author_user_id: row.get(3)?,
        rating,
        content: row.get(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

pub async fn find_subscription(
    conn: &Connection,
    user_id: i64,
    syllabus_id: i64,
) -> Result<Option<Subscription>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SUBSCRIPTION_COLS} FROM subscriptions WHERE user_id = ?1 AND syllabus_id = ?2"
            ),
            libsql::params![user_id, syllabus_id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_subscription(&row)).transpose()
}

pub async fn insert_subscription(
    conn: &Connection,
    user_id: i64,
    syllabus_id: i64,
    created_at: DateTime<Utc>,
) -> Result<Subscription, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO subscriptions (user_id, syllabus_id, created_at)
             VALUES (?1, ?2, ?3) RETURNING id",
            libsql::params![user_id, syllabus_id, created_at.to_rfc3339()],
        )
        .await?;
    Ok(Subscription {
        id: returning_id(rows).await?,
        user_id,
        syllabus_id,
        created_at,
    })
}

pub async fn insert_feedback(conn: &Connection, new: &NewFeedback) -> Result<Feedback, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO feedback (syllabus_id, version_id, author_user_id, rating, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
            libsql::params![
                new.syllabus_id,
                new.version_id,
                new.author_user_id,
                new.rating.map(i64::from),
                new.content.as_str(),
                new.created_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(Feedback {
        id: returning_id(rows).await?,
        syllabus_id: new.syllabus_id,
        version_id: new.version_id,
        author_user_id: new.author_user_id,
        rating: new.rating,
        content: new.content.clone(),
        created_at: new.created_at,
    })
}

pub async fn list_feedback(conn: &Connection, syllabus_id: i64) -> Result<Vec<Feedback>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {FEEDBACK_COLS} FROM feedback WHERE syllabus_id = ?1 ORDER BY created_at, id"
            ),
            [syllabus_id],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_feedback(&row)?);
    }
    Ok(out)
}

impl EngagementRepository for SqlTransaction {
    async fn find_subscription(
        &mut self,
        user_id: i64,
        syllabus_id: i64,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(find_subscription(&self.tx, user_id, syllabus_id).await?)
    }

    async fn add_subscription(
        &mut self,
        user_id: i64,
        syllabus_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Subscription, RepositoryError> {
        Ok(insert_subscription(&self.tx, user_id, syllabus_id, created_at).await?)
    }

    async fn add_feedback(&mut self, new: NewFeedback) -> Result<Feedback, RepositoryError> {
        Ok(insert_feedback(&self.tx, &new).await?)
    }

    async fn list_feedback(&mut self, syllabus_id: i64) -> Result<Vec<Feedback>, RepositoryError> {
        Ok(list_feedback(&self.tx, syllabus_id).await?)
    }
}
