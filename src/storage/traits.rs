//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::LinkStatus;
use crate::storage::{AppliedCheck, CheckRecord, LinkRecord, MonitoredLink, NewCheck, UserRecord};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Link not found: {0}")]
    LinkNotFound(i64),

    #[error("Link is inactive: {0}")]
    LinkInactive(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Link status fields are only ever written through [`Storage::apply_check`],
/// which appends the check record and updates the link in one transaction.
pub trait Storage {
    // ===== Users =====

    /// Inserts a user and returns its ID
    fn insert_user(&mut self, email: &str, plan: &str) -> StorageResult<i64>;

    /// Gets a user by ID
    fn get_user(&self, user_id: i64) -> StorageResult<Option<UserRecord>>;

    // ===== Links =====

    /// Inserts a new active link with status `unknown` and returns its ID
    fn insert_link(&mut self, user_id: i64, url: &str, name: Option<&str>) -> StorageResult<i64>;

    /// Gets a link by ID, active or not
    fn get_link(&self, link_id: i64) -> StorageResult<Option<LinkRecord>>;

    /// Gets a link together with its owner's plan and contact address
    fn get_monitored_link(&self, link_id: i64) -> StorageResult<Option<MonitoredLink>>;

    /// Lists every active link with owner plan and contact, ordered by ID
    fn list_active_links(&self) -> StorageResult<Vec<MonitoredLink>>;

    /// Counts a user's active links
    fn count_active_links(&self, user_id: i64) -> StorageResult<u32>;

    /// Gets a user's active links, oldest first
    fn list_user_links(&self, user_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Sets the soft-delete flag; returns false if the link does not exist
    fn set_link_active(&mut self, link_id: i64, active: bool) -> StorageResult<bool>;

    /// Sets or clears the display name; returns false if the link does not exist
    fn rename_link(&mut self, link_id: i64, name: Option<&str>) -> StorageResult<bool>;

    // ===== Checks =====

    /// Records a check result against an active link
    ///
    /// In a single transaction:
    /// - appends the check record
    /// - sets `last_checked` and `status`
    /// - sets `last_status_change` when the status differs from the previous one
    ///
    /// Writes for one link are expected to be serialized by the caller; the
    /// latest write always decides the status.
    ///
    /// # Errors
    ///
    /// * `LinkNotFound` / `LinkInactive` - nothing is written
    fn apply_check(&mut self, link_id: i64, check: &NewCheck) -> StorageResult<AppliedCheck>;

    /// Gets the most recent `limit` checks for a link, newest first
    fn recent_checks(&self, link_id: i64, limit: u32) -> StorageResult<Vec<CheckRecord>>;

    // ===== Statistics =====

    /// Counts active links by status
    fn count_links_by_status(&self) -> StorageResult<HashMap<LinkStatus, u64>>;

    /// Counts all users
    fn count_users(&self) -> StorageResult<u64>;

    /// Counts all check records
    fn count_checks(&self) -> StorageResult<u64>;
}
