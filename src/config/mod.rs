//! Configuration module for Linkwatch
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turns the configured plan tiers into a [`PlanPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use linkwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkwatch.toml")).unwrap();
//! println!("Batch pass every {}s", config.monitor.check_period_secs);
//! ```

mod parser;
mod plans;
mod types;
mod validation;

// Re-export types
pub use plans::{PlanPolicy, PlanTable};
pub use types::{
    Config, MailgunConfig, MonitorConfig, NotifierConfig, PlanDefaults, PlanEntry, StorageConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
