//! Scoped transaction: commit on success, roll back on any error

use sqlx::{PgConnection, Postgres, Transaction};

use crate::error::AppResult;

/// One all-or-nothing library operation.
///
/// Obtain it from [`super::Repository::begin`], run the operation body against
/// [`UnitOfWork::conn`], then hand the body's result to [`UnitOfWork::finish`].
/// A unit of work dropped without `finish` (early return, panic, cancelled
/// future) is rolled back by the underlying `sqlx` transaction.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
    operation: &'static str,
}

impl UnitOfWork {
    pub(super) fn new(tx: Transaction<'static, Postgres>, operation: &'static str) -> Self {
        Self { tx, operation }
    }

    /// Connection bound to this transaction
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit if `result` is `Ok`, otherwise roll back and return the original error.
    ///
    /// A failed rollback is logged and swallowed. A failed commit is returned
    /// as a storage error.
    pub async fn finish<T>(self, result: AppResult<T>) -> AppResult<T> {
        let operation = self.operation;

        match result {
            Ok(value) => {
                self.tx.commit().await?;
                tracing::trace!(operation, "committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.tx.rollback().await {
                    tracing::warn!(operation, "Rollback failed: {}", rollback_err);
                } else {
                    tracing::debug!(operation, "rolled back: {}", err);
                }
                Err(err)
            }
        }
    }
}
