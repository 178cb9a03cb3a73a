//! Linkwatch: scheduled uptime monitoring for user-owned links
//!
//! This crate implements the monitoring core of a link uptime service: it probes
//! URLs on a per-plan schedule, records check history, tracks up/down status
//! transitions, and raises a single alert when a link goes down.

pub mod config;
pub mod monitor;
pub mod notify;
pub mod output;
pub mod probe;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Linkwatch operations
#[derive(Debug, Error)]
pub enum LinkwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Notification error: {0}")]
    Notify(#[from] notify::NotifyError),

    #[error("Link not found: {0}")]
    LinkNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Link {link_id} does not belong to user {user_id}")]
    NotOwner { link_id: i64, user_id: i64 },

    #[error("Link limit reached for {plan} plan ({limit} links)")]
    LinkLimitReached { plan: String, limit: u32 },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Linkwatch operations
pub type Result<T> = std::result::Result<T, LinkwatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, PlanPolicy, PlanTable};
pub use monitor::{BatchSummary, Monitor, Scheduler, SchedulerHandle, StatusTracker};
pub use probe::{FailureKind, ProbeResult, Prober};
pub use state::LinkStatus;
pub use url::normalize_link_url;
