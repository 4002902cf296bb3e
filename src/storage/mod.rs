//! Storage module for persisting crawl output
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - A small connection pool shared by the consumer loops
//! - Insert statement building for row-shaped records
//! - Feed checkpoint persistence

mod checkpoint;
mod pool;
mod records;
mod schema;
mod statement;

pub use checkpoint::{CheckpointStore, SqliteCheckpointStore, StoredCheckpoint};
pub use pool::{ConnectionPool, PooledConnection};
pub use records::{ArticleRecord, ErrorRecord, ARTICLE_TABLE, ERROR_TABLE};
pub use schema::initialize_schema;
pub use statement::{InsertStatement, SqlRecord};

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record for table {table} has no value for column {column}")]
    MissingColumn { table: String, column: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection pool is closed")]
    PoolClosed,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
