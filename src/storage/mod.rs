//! Storage module for persisting links and check history
//!
//! This module handles all database operations for the monitor, including:
//! - SQLite database initialization and schema management
//! - Link lookups for scheduling and on-demand checks
//! - The atomic check-record + status update
//! - Bounded history reads

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::probe::ProbeResult;
use crate::state::{LinkStatus, Transition};
use crate::LinkwatchError;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage shared between the scheduler and on-demand callers
pub type SharedStorage = Arc<Mutex<dyn Storage + Send>>;

/// Opens the SQLite store at `path` and wraps it for sharing
pub fn open_shared(path: &Path) -> Result<SharedStorage, LinkwatchError> {
    let storage = SqliteStorage::new(path)?;
    Ok(Arc::new(Mutex::new(storage)))
}

/// Locks shared storage, turning a poisoned lock into an error
pub fn lock(
    storage: &SharedStorage,
) -> Result<MutexGuard<'_, dyn Storage + Send + 'static>, LinkwatchError> {
    storage
        .lock()
        .map_err(|_| LinkwatchError::LockPoisoned)
}

/// Represents an account that owns links
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a monitored link in the database
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub name: Option<String>,
    pub status: LinkStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_status_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl LinkRecord {
    /// The name shown to users: the display name if set, else the URL
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.url,
        }
    }
}

/// A link joined with what the monitor needs from its owner
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredLink {
    pub link: LinkRecord,
    /// Owner's plan identifier, resolved through the plan policy
    pub plan: String,
    /// Owner's alert address
    pub contact: String,
}

/// One immutable probe outcome for a link
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRecord {
    pub id: i64,
    pub link_id: i64,
    pub checked_at: DateTime<Utc>,
    pub status_code: Option<u16>,
    pub latency_secs: f64,
    pub is_up: bool,
    pub error_message: Option<String>,
}

/// A check result waiting to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheck {
    pub checked_at: DateTime<Utc>,
    pub status_code: Option<u16>,
    pub latency_secs: f64,
    pub is_up: bool,
    pub error_message: Option<String>,
}

impl NewCheck {
    /// Captures a probe result as completed at `checked_at`
    pub fn from_probe(result: &ProbeResult, checked_at: DateTime<Utc>) -> Self {
        Self {
            checked_at,
            status_code: result.status_code,
            latency_secs: result.latency_secs,
            is_up: result.is_up,
            error_message: result.error_message(),
        }
    }
}

/// What [`Storage::apply_check`] wrote
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCheck {
    pub record: CheckRecord,
    /// Status before and after this check
    pub transition: Transition,
}

impl AppliedCheck {
    /// True when this check moved the link into `Down`
    pub fn went_down(&self) -> bool {
        self.transition.went_down()
    }
}
