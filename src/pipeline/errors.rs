//! Error consumer
//!
//! Last stop for failed rows. There is nowhere further to send a record that
//! cannot be stored here, so such failures are logged and the record dropped.

use crate::pipeline::{ErrorReceiver, PipelineCounters};
use crate::storage::{ConnectionPool, ErrorRecord, InsertStatement, StorageResult, ERROR_TABLE};
use rusqlite::params_from_iter;
use std::sync::Arc;

/// Drains the error queue into the `error` table
///
/// Runs until every [`ErrorQueue`](crate::pipeline::ErrorQueue) sender has been
/// dropped. A failed insert never stops the loop.
pub async fn store_errors(
    pool: ConnectionPool,
    mut errors: ErrorReceiver,
    counters: Arc<PipelineCounters>,
) {
    let insert = InsertStatement::for_record::<ErrorRecord>(ERROR_TABLE);

    while let Some(error) = errors.recv().await {
        tracing::warn!("Error for {}: {}", error.url, error.message);

        match persist_error(&pool, &insert, &error).await {
            Ok(()) => counters.error_stored(),
            Err(e) => {
                tracing::error!("Dropping error record for {}: {}", error.url, e);
                counters.error_dropped();
            }
        }
    }

    tracing::info!("Error queue closed, error consumer stopping");
}

async fn persist_error(
    pool: &ConnectionPool,
    insert: &InsertStatement,
    error: &ErrorRecord,
) -> StorageResult<()> {
    let args = insert.order_args(error)?;
    let conn = pool.acquire().await?;
    conn.execute(insert.sql(), params_from_iter(args))?;
    Ok(())
}
