//! Article consumer
//!
//! Persists delivery batches one row at a time. A failing row never aborts its
//! batch: it is handed to the error queue and the loop moves on.

use crate::pipeline::{DeliveryReceiver, ErrorQueue, PipelineCounters};
use crate::storage::{
    ArticleRecord, ConnectionPool, ErrorRecord, InsertStatement, StorageResult, ARTICLE_TABLE,
};
use rusqlite::{params_from_iter, Connection, Statement};
use std::fmt::Display;
use std::sync::Arc;

/// Drains the delivery queue into the `article` table
///
/// Runs until every [`DeliveryQueue`](crate::pipeline::DeliveryQueue) sender
/// has been dropped. Each batch checks out one connection, attempts every row,
/// and is acknowledged once no matter how many rows were diverted.
pub async fn store_articles(
    pool: ConnectionPool,
    mut deliveries: DeliveryReceiver,
    errors: ErrorQueue,
    counters: Arc<PipelineCounters>,
) {
    let insert = InsertStatement::for_record::<ArticleRecord>(ARTICLE_TABLE);
    let sql = insert.returning("url");

    while let Some(batch) = deliveries.recv().await {
        tracing::info!("Received {} articles", batch.len());

        match pool.acquire().await {
            Ok(conn) => insert_batch(&conn, &insert, &sql, &batch, &errors, &counters),
            Err(e) => {
                tracing::warn!("No connection for batch of {}: {}", batch.len(), e);
                for article in &batch {
                    divert(&errors, &counters, &e, article);
                }
            }
        }

        counters.batch_acknowledged();
    }

    tracing::info!("Delivery queue closed, article consumer stopping");
}

fn insert_batch(
    conn: &Connection,
    insert: &InsertStatement,
    sql: &str,
    batch: &[ArticleRecord],
    errors: &ErrorQueue,
    counters: &PipelineCounters,
) {
    let mut stmt = match conn.prepare(sql) {
        Ok(stmt) => stmt,
        Err(e) => {
            tracing::warn!("Failed to prepare article insert: {}", e);
            for article in batch {
                divert(errors, counters, &e, article);
            }
            return;
        }
    };

    for article in batch {
        match insert_one(&mut stmt, insert, article) {
            Ok(url) => {
                tracing::debug!("Stored {}", url);
                counters.article_stored();
            }
            Err(e) => divert(errors, counters, &e, article),
        }
    }
}

fn insert_one(
    stmt: &mut Statement<'_>,
    insert: &InsertStatement,
    article: &ArticleRecord,
) -> StorageResult<String> {
    let args = insert.order_args(article)?;
    let url = stmt.query_row(params_from_iter(args), |row| row.get(0))?;
    Ok(url)
}

fn divert(errors: &ErrorQueue, counters: &PipelineCounters, error: &impl Display, article: &ArticleRecord) {
    tracing::warn!("Failed to store {}: {}", article.url, error);
    counters.article_diverted();
    if errors.send(ErrorRecord::from_failure(error, article)).is_err() {
        tracing::error!("Error queue closed, lost failure record for {}", article.url);
    }
}
