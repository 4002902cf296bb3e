//! Durable delivery pipeline
//!
//! Two queue-driven consumers move crawl output into SQLite:
//!
//! - `store_articles` drains batches from the delivery queue and inserts each
//!   article on its own; a row that fails is turned into an [`ErrorRecord`]
//!   and pushed onto the error queue while the rest of the batch carries on.
//! - `store_errors` drains the error queue into the `error` table. If that
//!   insert fails too, the record is logged and dropped.
//!
//! Nothing is retried. Each consumer runs until every sender of its queue is
//! gone.

mod articles;
mod errors;
mod stats;

pub use articles::store_articles;
pub use errors::store_errors;
pub use stats::{PipelineCounters, PipelineStats};

use crate::storage::{ArticleRecord, ErrorRecord};
use tokio::sync::mpsc;

/// Producer side of the article hand-off
pub type DeliveryQueue = mpsc::UnboundedSender<Vec<ArticleRecord>>;

/// Consumer side of the article hand-off
pub type DeliveryReceiver = mpsc::UnboundedReceiver<Vec<ArticleRecord>>;

/// Producer side of the error hand-off
pub type ErrorQueue = mpsc::UnboundedSender<ErrorRecord>;

/// Consumer side of the error hand-off
pub type ErrorReceiver = mpsc::UnboundedReceiver<ErrorRecord>;

/// Creates the unbounded FIFO feeding `store_articles`
pub fn delivery_queue() -> (DeliveryQueue, DeliveryReceiver) {
    mpsc::unbounded_channel()
}

/// Creates the unbounded FIFO feeding `store_errors`
pub fn error_queue() -> (ErrorQueue, ErrorReceiver) {
    mpsc::unbounded_channel()
}
