//! Statistics generation from the monitoring database
//!
//! This module provides functionality for extracting and displaying
//! monitoring statistics from the storage layer.

use crate::state::LinkStatus;
use crate::storage::Storage;
use crate::LinkwatchError;
use std::collections::HashMap;

/// Monitoring statistics summary
#[derive(Debug, Clone)]
pub struct MonitorStatistics {
    /// Number of registered users
    pub total_users: u64,

    /// Number of links currently being monitored
    pub active_links: u64,

    /// Count of active links by current status
    pub links_by_status: HashMap<LinkStatus, u64>,

    /// Number of check records ever written
    pub total_checks: u64,
}

impl MonitorStatistics {
    /// Active links with the given status
    pub fn count(&self, status: LinkStatus) -> u64 {
        self.links_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Share of checked links that are currently up, as a percentage
    ///
    /// Links that have never been checked are left out.
    pub fn availability(&self) -> Option<f64> {
        let up = self.count(LinkStatus::Up);
        let checked = up + self.count(LinkStatus::Down);
        if checked == 0 {
            None
        } else {
            Some(up as f64 / checked as f64 * 100.0)
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(MonitorStatistics)` - Successfully loaded statistics
/// * `Err(LinkwatchError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<MonitorStatistics, LinkwatchError> {
    let links_by_status = storage.count_links_by_status()?;

    Ok(MonitorStatistics {
        total_users: storage.count_users()?,
        active_links: links_by_status.values().sum(),
        links_by_status,
        total_checks: storage.count_checks()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &MonitorStatistics) {
    println!("=== Monitoring Statistics ===\n");

    println!("Overview:");
    println!("  Users: {}", stats.total_users);
    println!("  Active links: {}", stats.active_links);
    println!("  Checks recorded: {}", stats.total_checks);
    println!();

    println!("Links by Status:");
    for status in [LinkStatus::Up, LinkStatus::Down, LinkStatus::Unknown] {
        let count = stats.count(status);
        let percentage = if stats.active_links > 0 {
            (count as f64 / stats.active_links as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    match stats.availability() {
        Some(rate) => println!(
            "Availability: {:.1}% of checked links are up",
            rate
        ),
        None => println!("Availability: no links checked yet"),
    }
}
