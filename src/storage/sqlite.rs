//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::LinkStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{AppliedCheck, CheckRecord, LinkRecord, MonitoredLink, NewCheck, UserRecord};
use crate::LinkwatchError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const LINK_COLUMNS: &str = "l.id, l.user_id, l.url, l.name, l.status, l.last_checked, \
     l.last_status_change, l.created_at, l.active";

const MONITORED_QUERY: &str = "SELECT l.id, l.user_id, l.url, l.name, l.status, l.last_checked, \
     l.last_status_change, l.created_at, l.active, u.plan, u.email \
     FROM links l JOIN users u ON u.id = l.user_id";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and initializes the schema
    pub fn new(path: &Path) -> Result<Self, LinkwatchError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, LinkwatchError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Raw connection, for tests that need to inject SQL-level faults
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        url: row.get(2)?,
        name: row.get(3)?,
        status: LinkStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(LinkStatus::Unknown),
        last_checked: row.get(5)?,
        last_status_change: row.get(6)?,
        created_at: row.get(7)?,
        active: row.get(8)?,
    })
}

fn monitored_from_row(row: &Row<'_>) -> rusqlite::Result<MonitoredLink> {
    Ok(MonitoredLink {
        link: link_from_row(row)?,
        plan: row.get(9)?,
        contact: row.get(10)?,
    })
}

fn check_from_row(row: &Row<'_>) -> rusqlite::Result<CheckRecord> {
    Ok(CheckRecord {
        id: row.get(0)?,
        link_id: row.get(1)?,
        checked_at: row.get(2)?,
        status_code: row.get(3)?,
        latency_secs: row.get(4)?,
        is_up: row.get(5)?,
        error_message: row.get(6)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Users =====

    fn insert_user(&mut self, email: &str, plan: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO users (email, plan, created_at) VALUES (?1, ?2, ?3)",
            params![email, plan, Utc::now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_user(&self, user_id: i64) -> StorageResult<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, plan, created_at FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        plan: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    // ===== Links =====

    fn insert_link(&mut self, user_id: i64, url: &str, name: Option<&str>) -> StorageResult<i64> {
        if self.get_user(user_id)?.is_none() {
            return Err(StorageError::UserNotFound(user_id));
        }

        self.conn.execute(
            "INSERT INTO links (user_id, url, name, status, created_at, active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                user_id,
                url,
                name,
                LinkStatus::Unknown.to_db_string(),
                Utc::now()
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_link(&self, link_id: i64) -> StorageResult<Option<LinkRecord>> {
        let sql = format!("SELECT {} FROM links l WHERE l.id = ?1", LINK_COLUMNS);
        let link = self
            .conn
            .query_row(&sql, params![link_id], link_from_row)
            .optional()?;
        Ok(link)
    }

    fn get_monitored_link(&self, link_id: i64) -> StorageResult<Option<MonitoredLink>> {
        let sql = format!("{} WHERE l.id = ?1", MONITORED_QUERY);
        let link = self
            .conn
            .query_row(&sql, params![link_id], monitored_from_row)
            .optional()?;
        Ok(link)
    }

    fn list_active_links(&self) -> StorageResult<Vec<MonitoredLink>> {
        let sql = format!("{} WHERE l.active = 1 ORDER BY l.id", MONITORED_QUERY);
        let mut stmt = self.conn.prepare(&sql)?;

        let links = stmt
            .query_map([], monitored_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn list_user_links(&self, user_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let sql = format!(
            "SELECT {} FROM links l WHERE l.user_id = ?1 AND l.active = 1 ORDER BY l.id",
            LINK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let links = stmt
            .query_map(params![user_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn count_active_links(&self, user_id: i64) -> StorageResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE user_id = ?1 AND active = 1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn set_link_active(&mut self, link_id: i64, active: bool) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE links SET active = ?1 WHERE id = ?2",
            params![active, link_id],
        )?;
        Ok(updated > 0)
    }

    fn rename_link(&mut self, link_id: i64, name: Option<&str>) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE links SET name = ?1 WHERE id = ?2",
            params![name, link_id],
        )?;
        Ok(updated > 0)
    }

    // ===== Checks =====

    fn apply_check(&mut self, link_id: i64, check: &NewCheck) -> StorageResult<AppliedCheck> {
        let tx = self.conn.transaction()?;

        let current: Option<(String, bool)> = tx
            .query_row(
                "SELECT status, active FROM links WHERE id = ?1",
                params![link_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (status, active) = current.ok_or(StorageError::LinkNotFound(link_id))?;
        if !active {
            return Err(StorageError::LinkInactive(link_id));
        }
        let previous = LinkStatus::from_db_string(&status).unwrap_or(LinkStatus::Unknown);

        tx.execute(
            "INSERT INTO checks (link_id, checked_at, status_code, response_time, is_up, error_message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                link_id,
                check.checked_at,
                check.status_code,
                check.latency_secs,
                check.is_up,
                check.error_message
            ],
        )?;
        let check_id = tx.last_insert_rowid();

        // Status follows the latest write, whatever its timestamp says
        let transition = previous.transition(check.is_up);
        if transition.is_change() {
            tx.execute(
                "UPDATE links SET status = ?1, last_checked = ?2, last_status_change = ?2
                 WHERE id = ?3",
                params![transition.to.to_db_string(), check.checked_at, link_id],
            )?;
        } else {
            tx.execute(
                "UPDATE links SET status = ?1, last_checked = ?2 WHERE id = ?3",
                params![transition.to.to_db_string(), check.checked_at, link_id],
            )?;
        }

        tx.commit()?;

        Ok(AppliedCheck {
            record: CheckRecord {
                id: check_id,
                link_id,
                checked_at: check.checked_at,
                status_code: check.status_code,
                latency_secs: check.latency_secs,
                is_up: check.is_up,
                error_message: check.error_message.clone(),
            },
            transition,
        })
    }

    fn recent_checks(&self, link_id: i64, limit: u32) -> StorageResult<Vec<CheckRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, link_id, checked_at, status_code, response_time, is_up, error_message
             FROM checks WHERE link_id = ?1
             ORDER BY checked_at DESC, id DESC
             LIMIT ?2",
        )?;

        let checks = stmt
            .query_map(params![link_id, limit], check_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(checks)
    }

    // ===== Statistics =====

    fn count_links_by_status(&self) -> StorageResult<HashMap<LinkStatus, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM links WHERE active = 1 GROUP BY status")?;

        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (status, count) = row?;
            let status = LinkStatus::from_db_string(&status).unwrap_or(LinkStatus::Unknown);
            *counts.entry(status).or_insert(0) += count as u64;
        }

        Ok(counts)
    }

    fn count_users(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_checks(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM checks", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
