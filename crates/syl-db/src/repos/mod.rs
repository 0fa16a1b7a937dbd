//! SQL for each aggregate.
//!
//! Each module exposes free functions over `&libsql::Connection` (a
//! `libsql::Transaction` derefs to one) and implements the matching
//! `syl-core` repository trait for [`SqlTransaction`](crate::SqlTransaction)
//! by delegating to them.

pub mod directory;
pub mod engagement;
pub mod file;
pub mod syllabus;
