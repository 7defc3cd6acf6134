use super::{DbConnection, DbPool};
use crate::errors::{IntoCore, StorageError};
use diesel::SqliteConnection;
use eodgate_core::errors::{DatabaseError, Error, Result};
use log::{debug, warn};
use std::any::Any;
use tokio::sync::{mpsc, oneshot};

// A unit of work run on the writer's connection inside one immediate
// transaction. Returns core::Result since that's what callers expect.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type AnyResult = Result<Box<dyn Any + Send + 'static>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<Box<dyn Any + Send + 'static>>, oneshot::Sender<AnyResult>)>,
}

fn writer_gone() -> Error {
    Error::Database(DatabaseError::ConnectionFailed(
        "database writer is not running".to_string(),
    ))
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; an `Err` rolls it back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone())?;

        let boxed = ret_rx.await.map_err(|_| writer_gone())??;
        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "writer returned an unexpected result type".to_string(),
            ))
        })
    }
}

/// Spawns a background Tokio task that acts as a single writer to the database.
///
/// The actor holds one pooled connection and processes jobs serially. If the
/// connection cannot be obtained, the job fails with a connection error and
/// the next job tries again.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<AnyResult>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn: Option<DbConnection> = None;

        while let Some((job, reply_tx)) = rx.recv().await {
            if conn.is_none() {
                match pool.get().into_core() {
                    Ok(c) => conn = Some(c),
                    Err(e) => {
                        warn!("Writer could not acquire a connection: {}", e);
                        let _ = reply_tx.send(Err(e));
                        continue;
                    }
                }
            }

            let mut job_error: Option<Error> = None;
            let result: AnyResult = match conn.as_mut() {
                Some(c) => c
                    .immediate_transaction::<_, StorageError, _>(|c| {
                        job(c).map_err(|e| {
                            let wrapped = StorageError::CoreError(e.to_string());
                            job_error = Some(e);
                            wrapped
                        })
                    })
                    // Hand back the job's own error so its classification survives the rollback
                    .map_err(|e: StorageError| job_error.take().unwrap_or_else(|| e.into())),
                None => Err(writer_gone()),
            };

            // Ignore error if the receiver has dropped (e.g., request was cancelled).
            let _ = reply_tx.send(result);
        }
        debug!("Database writer stopped");
    });

    WriteHandle { tx }
}
