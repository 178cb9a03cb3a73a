//! Output module for operator-facing reports
//!
//! This module handles:
//! - Summarizing the monitoring database (`--stats`)
//! - Printing a link's recent check history (`--history`)
//! - Listing a user's links (`--links`)

mod history;
pub mod stats;

pub use history::{format_check_line, format_link_line, load_history, print_history};
pub use stats::{load_statistics, print_statistics, MonitorStatistics};
