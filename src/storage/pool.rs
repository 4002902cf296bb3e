//! SQLite connection pool
//!
//! A fixed set of connections opened up front. Checkout waits on a semaphore
//! so callers suspend instead of spinning when every connection is busy, and
//! the guard puts the connection back when it is dropped.

use crate::storage::schema::initialize_schema;
use crate::storage::{StorageError, StorageResult};
use rusqlite::Connection;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    size: usize,
}

/// Shared handle to a fixed-size set of SQLite connections
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("size", &self.inner.size)
            .field("available", &self.inner.permits.available_permits())
            .finish()
    }
}

impl ConnectionPool {
    /// Opens `size` connections to the database at `path`, creating the schema if needed
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionPool)` - All connections opened
    /// * `Err(StorageError)` - Failed to open a connection or create the schema
    pub fn open(path: &Path, size: usize) -> StorageResult<Self> {
        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);

        for _ in 0..size {
            let conn = Connection::open(path)?;
            conn.busy_timeout(Duration::from_secs(5))?;
            // journal_mode returns a row, so it cannot go through execute_batch
            conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
            conn.execute_batch(
                "
                PRAGMA synchronous = NORMAL;
                PRAGMA temp_store = MEMORY;
            ",
            )?;
            connections.push(conn);
        }

        initialize_schema(&connections[0])?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(connections),
                permits: Arc::new(Semaphore::new(size)),
                size,
            }),
        })
    }

    /// Checks out a connection, waiting until one is free
    pub async fn acquire(&self) -> StorageResult<PooledConnection> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| StorageError::PoolClosed)?;

        let conn = self
            .inner
            .idle
            .lock()
            .map_err(|_| StorageError::Database("connection pool lock poisoned".to_string()))?
            .pop()
            .ok_or_else(|| StorageError::Database("no idle connection behind permit".to_string()))?;

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Stops handing out connections; pending and future `acquire` calls fail
    pub fn close(&self) {
        self.inner.permits.close();
    }

    pub fn size(&self) -> usize {
        self.inner.size
    }

    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }
}

/// A checked-out connection, returned to the pool on drop
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in Drop
        self.conn.as_ref().expect("pooled connection already returned")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        // Runs before `_permit` is released, so the next waiter finds it idle
        if let Some(conn) = self.conn.take() {
            if let Ok(mut idle) = self.pool.idle.lock() {
                idle.push(conn);
            }
        }
    }
}
