//! Commit-or-rollback for one unit of work.

use syl_core::repository::StoreTransaction;
use tracing::warn;

use crate::error::WorkflowError;

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the
/// original error. A failed rollback is logged, never surfaced.
pub(crate) async fn finish<T, R>(
    tx: T,
    result: Result<R, WorkflowError>,
    operation: &'static str,
) -> Result<R, WorkflowError>
where
    T: StoreTransaction,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(operation, error = %rollback, "rollback failed");
            }
            Err(err)
        }
    }
}
