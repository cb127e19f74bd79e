use libsql::Connection;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::OwnedRwLockWriteGuard;

use crate::Db;

/// Errors that can occur during transaction management
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("failed to begin transaction")]
    Begin,
    #[error("failed to commit transaction")]
    Commit,
}

/// Write access to the shared connection while a transaction is open.
///
/// If it is dropped before `finish`, because the closure panicked or the
/// request future was cancelled, the lock moves into a background task that
/// issues `ROLLBACK` and only then releases it. No other request can run
/// statements inside the abandoned transaction.
struct OpenTransaction {
    lock: Option<OwnedRwLockWriteGuard<Connection>>,
}

impl OpenTransaction {
    fn finish(mut self) {
        drop(self.lock.take());
    }
}

impl Drop for OpenTransaction {
    fn drop(&mut self) {
        let Some(lock) = self.lock.take() else {
            return;
        };

        tracing::warn!("transaction abandoned before completion, rolling back");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = lock.execute("ROLLBACK", ()).await {
                        tracing::error!(error = %e, "rollback of abandoned transaction failed");
                    }
                });
            }
            Err(_) => {
                tracing::error!("no runtime available to roll back abandoned transaction");
            }
        }
    }
}

async fn rollback(conn: &Connection) {
    if let Err(e) = conn.execute("ROLLBACK", ()).await {
        tracing::error!(error = %e, "rollback failed");
    }
}

/// Run `f` inside `BEGIN`/`COMMIT` on the shared connection.
///
/// The write lock is held for the whole transaction, so no other request can
/// interleave statements on the same connection. Any `Err` returned by `f`
/// triggers a `ROLLBACK`, and so does a panic in `f` or dropping the returned
/// future midway.
///
/// The closure must return a boxed future to handle lifetime issues with async closures.
pub async fn with_transaction<F, T, E>(db: &Db, f: F) -> Result<T, E>
where
    F: for<'a> FnOnce(&'a Connection) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
    E: From<TransactionError>,
{
    let lock = db.clone().write_owned().await;
    // Same underlying connection; statements go through this handle while the
    // guard keeps the lock.
    let conn = Connection::clone(&lock);
    let open = OpenTransaction { lock: Some(lock) };

    if let Err(e) = conn.execute("BEGIN TRANSACTION", ()).await {
        tracing::error!(error = %e, "begin transaction failed");
        open.finish();
        return Err(TransactionError::Begin.into());
    }

    let outcome = match f(&conn).await {
        Ok(result) => {
            if let Err(e) = conn.execute("COMMIT", ()).await {
                tracing::error!(error = %e, "commit failed");
                rollback(&conn).await;
                Err(TransactionError::Commit.into())
            } else {
                Ok(result)
            }
        }
        Err(e) => {
            rollback(&conn).await;
            Err(e)
        }
    };

    open.finish();
    outcome
}
