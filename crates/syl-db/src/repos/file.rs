//! File asset metadata.

use libsql::Connection;

use syl_core::entities::{FileAsset, NewFileAsset};
use syl_core::repository::{FileRepository, RepositoryError};

use crate::SqlTransaction;
use crate::error::DatabaseError;
use crate::helpers::{get_unsigned, parse_datetime, returning_id};

const SELECT_COLS: &str = "id, syllabus_version_id, original_filename, display_name, bucket, \
     object_path, mime_type, size_bytes, uploaded_by, created_at";

fn row_to_file(row: &libsql::Row) -> Result<FileAsset, DatabaseError> {
    Ok(FileAsset {
        id: row.get(0)?,
        syllabus_version_id: row.get(1)?,
        original_filename: row.get(2)?,
        display_name: row.get(3)?,
        bucket: row.get(4)?,
        object_path: row.get(5)?,
        mime_type: row.get(6)?,
        size_bytes: get_unsigned(row, 7, "file_assets.size_bytes")?,
        uploaded_by: row.get(8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

fn size_param(size_bytes: u64) -> Result<i64, DatabaseError> {
    i64::try_from(size_bytes)
        .map_err(|_| DatabaseError::InvalidState(format!("size_bytes {size_bytes} exceeds i64")))
}

pub async fn insert_file(conn: &Connection, new: &NewFileAsset) -> Result<FileAsset, DatabaseError> {
    let rows = conn
        .query(
            "INSERT INTO file_assets
                 (syllabus_version_id, original_filename, display_name, bucket, object_path,
                  mime_type, size_bytes, uploaded_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING id",
            libsql::params![
                new.syllabus_version_id,
                new.original_filename.as_str(),
                new.display_name.as_str(),
                new.bucket.as_str(),
                new.object_path.as_str(),
                new.mime_type.as_str(),
                size_param(new.size_bytes)?,
                new.uploaded_by,
                new.created_at.to_rfc3339()
            ],
        )
        .await?;
    Ok(FileAsset {
        id: returning_id(rows).await?,
        syllabus_version_id: new.syllabus_version_id,
        original_filename: new.original_filename.clone(),
        display_name: new.display_name.clone(),
        bucket: new.bucket.clone(),
        object_path: new.object_path.clone(),
        mime_type: new.mime_type.clone(),
        size_bytes: new.size_bytes,
        uploaded_by: new.uploaded_by,
        created_at: new.created_at,
    })
}

pub async fn get_file(conn: &Connection, id: i64) -> Result<Option<FileAsset>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM file_assets WHERE id = ?1"),
            [id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_file(&row)).transpose()
}

pub async fn list_files(conn: &Connection, version_id: i64) -> Result<Vec<FileAsset>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM file_assets WHERE syllabus_version_id = ?1 ORDER BY id"
            ),
            [version_id],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_file(&row)?);
    }
    Ok(out)
}

pub async fn update_file(conn: &Connection, file: &FileAsset) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE file_assets
             SET original_filename = ?1, display_name = ?2, object_path = ?3,
                 mime_type = ?4, size_bytes = ?5
             WHERE id = ?6",
            libsql::params![
                file.original_filename.as_str(),
                file.display_name.as_str(),
                file.object_path.as_str(),
                file.mime_type.as_str(),
                size_param(file.size_bytes)?,
                file.id
            ],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

pub async fn delete_file(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute("DELETE FROM file_assets WHERE id = ?1", [id])
        .await?;
    Ok(changed > 0)
}

impl FileRepository for SqlTransaction {
    async fn add_file(&mut self, new: NewFileAsset) -> Result<FileAsset, RepositoryError> {
        Ok(insert_file(&self.tx, &new).await?)
    }

    async fn get_file(&mut self, id: i64) -> Result<Option<FileAsset>, RepositoryError> {
        Ok(get_file(&self.tx, id).await?)
    }

    async fn list_files(&mut self, version_id: i64) -> Result<Vec<FileAsset>, RepositoryError> {
        Ok(list_files(&self.tx, version_id).await?)
    }

    async fn update_file(&mut self, file: &FileAsset) -> Result<(), RepositoryError> {
        Ok(update_file(&self.tx, file).await?)
    }

    async fn delete_file(&mut self, id: i64) -> Result<bool, RepositoryError> {
        Ok(delete_file(&self.tx, id).await?)
    }
}
