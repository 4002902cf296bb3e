//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Evenflow database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Harvested article links
CREATE TABLE IF NOT EXISTS article (
    url TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    fake INTEGER NOT NULL,
    feed TEXT NOT NULL,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_article_feed ON article(feed);

-- Rows that could not be stored in article
CREATE TABLE IF NOT EXISTS error (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT NOT NULL,
    url TEXT NOT NULL,
    source TEXT NOT NULL,
    fake INTEGER NOT NULL,
    occurred_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_error_url ON error(url);

-- Latest checkpoint per feed
CREATE TABLE IF NOT EXISTS feed_state (
    name TEXT PRIMARY KEY,
    is_over INTEGER NOT NULL,
    data TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
