//! Feed checkpoint persistence
//!
//! The crawl driver saves a [`CrawlState`] after every page. Only the latest
//! state per feed is kept.

use crate::feed::CrawlState;
use crate::storage::{ConnectionPool, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// Where the crawl driver keeps per-feed progress
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Replaces the stored state of `state.name`
    async fn save(&self, state: &CrawlState) -> StorageResult<()>;

    /// Loads the latest state of a feed, if one was ever saved
    async fn load(&self, feed: &str) -> StorageResult<Option<CrawlState>>;
}

/// A checkpoint row with its bookkeeping columns
#[derive(Debug, Clone)]
pub struct StoredCheckpoint {
    pub state: CrawlState,
    pub config_hash: String,
    pub updated_at: String,
}

/// [`CheckpointStore`] backed by the `feed_state` table
#[derive(Debug, Clone)]
pub struct SqliteCheckpointStore {
    pool: ConnectionPool,
    config_hash: String,
}

impl SqliteCheckpointStore {
    /// Creates a store that stamps every saved state with `config_hash`
    pub fn new(pool: ConnectionPool, config_hash: impl Into<String>) -> Self {
        Self {
            pool,
            config_hash: config_hash.into(),
        }
    }

    /// Lists every stored checkpoint, ordered by feed name
    pub async fn list(&self) -> StorageResult<Vec<StoredCheckpoint>> {
        let conn = self.pool.acquire().await?;
        let mut stmt = conn.prepare(
            "SELECT name, is_over, data, config_hash, updated_at FROM feed_state ORDER BY name",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, is_over, data, config_hash, updated_at)| {
                Ok(StoredCheckpoint {
                    state: decode_state(name, is_over, &data)?,
                    config_hash,
                    updated_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn save(&self, state: &CrawlState) -> StorageResult<()> {
        let data = serde_json::to_string(&state.data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let conn = self.pool.acquire().await?;
        conn.execute(
            "INSERT INTO feed_state (name, is_over, data, config_hash, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(name) DO UPDATE SET
                is_over = excluded.is_over,
                data = excluded.data,
                config_hash = excluded.config_hash,
                updated_at = excluded.updated_at",
            params![state.name, state.is_over, data, self.config_hash, now],
        )?;
        Ok(())
    }

    async fn load(&self, feed: &str) -> StorageResult<Option<CrawlState>> {
        let conn = self.pool.acquire().await?;
        let row: Option<(bool, String)> = conn
            .query_row(
                "SELECT is_over, data FROM feed_state WHERE name = ?1",
                params![feed],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(is_over, data)| decode_state(feed.to_string(), is_over, &data))
            .transpose()
    }
}

fn decode_state(name: String, is_over: bool, data: &str) -> StorageResult<CrawlState> {
    let data = serde_json::from_str(data).map_err(|e| {
        StorageError::Serialization(format!("feed_state.data for {}: {}", name, e))
    })?;
    Ok(CrawlState {
        name,
        is_over,
        data,
    })
}
