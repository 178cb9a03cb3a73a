//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Linkwatch database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Owning accounts: only the fields the monitor reads
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    plan TEXT NOT NULL DEFAULT 'starter',
    created_at TEXT NOT NULL
);

-- Monitored links; soft-deleted via active = 0
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    url TEXT NOT NULL,
    name TEXT,
    status TEXT NOT NULL DEFAULT 'unknown',
    last_checked TEXT,
    last_status_change TEXT,
    created_at TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_links_user ON links(user_id);
CREATE INDEX IF NOT EXISTS idx_links_active ON links(active);

-- Append-only check history
CREATE TABLE IF NOT EXISTS checks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    link_id INTEGER NOT NULL REFERENCES links(id),
    checked_at TEXT NOT NULL,
    status_code INTEGER,
    response_time REAL NOT NULL,
    is_up INTEGER NOT NULL,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_checks_link_time ON checks(link_id, checked_at);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
