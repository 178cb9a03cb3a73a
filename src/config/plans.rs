//! Plan policy: check interval and link limit per subscription tier

use crate::config::types::{PlanDefaults, PlanEntry};
use std::collections::HashMap;
use std::time::Duration;

/// Lookup from plan identifier to monitoring policy
///
/// Unknown plan identifiers must resolve to a default rather than fail, so a
/// link whose owner carries a stale or misspelled plan is still monitored.
pub trait PlanPolicy: Send + Sync {
    /// Minimum time between scheduled checks for links on this plan
    fn interval_for(&self, plan: &str) -> Duration;

    /// Maximum number of active links a user on this plan may own
    fn link_limit_for(&self, plan: &str) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlanLimits {
    interval: Duration,
    link_limit: u32,
}

/// Table-backed [`PlanPolicy`] built from configuration
#[derive(Debug, Clone)]
pub struct PlanTable {
    plans: HashMap<String, PlanLimits>,
    default: PlanLimits,
}

impl PlanTable {
    /// Creates a table from configured entries and the fallback policy
    pub fn new(entries: &[PlanEntry], defaults: &PlanDefaults) -> Self {
        let plans = entries
            .iter()
            .map(|entry| {
                (
                    entry.name.clone(),
                    PlanLimits {
                        interval: Duration::from_secs(entry.check_interval_secs),
                        link_limit: entry.link_limit,
                    },
                )
            })
            .collect();

        Self {
            plans,
            default: PlanLimits {
                interval: Duration::from_secs(defaults.check_interval_secs),
                link_limit: defaults.link_limit,
            },
        }
    }

    /// Builds the table from a loaded configuration, falling back to the
    /// built-in tiers when no `[[plans]]` are configured
    pub fn from_config(config: &crate::config::Config) -> Self {
        if config.plans.is_empty() {
            let mut table = Self::standard();
            table.default = PlanLimits {
                interval: Duration::from_secs(config.plan_defaults.check_interval_secs),
                link_limit: config.plan_defaults.link_limit,
            };
            table
        } else {
            Self::new(&config.plans, &config.plan_defaults)
        }
    }

    /// The built-in tiers: starter (4h, 3 links), pro (2h, 10), business (1h, 50)
    pub fn standard() -> Self {
        let entries = [
            ("starter", 4 * 3600, 3),
            ("pro", 2 * 3600, 10),
            ("business", 3600, 50),
        ]
        .map(|(name, secs, limit)| PlanEntry {
            name: name.to_string(),
            check_interval_secs: secs,
            link_limit: limit,
        });

        Self::new(&entries, &PlanDefaults::default())
    }

    fn lookup(&self, plan: &str) -> PlanLimits {
        self.plans.get(plan).copied().unwrap_or(self.default)
    }
}

impl Default for PlanTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PlanPolicy for PlanTable {
    fn interval_for(&self, plan: &str) -> Duration {
        self.lookup(plan).interval
    }

    fn link_limit_for(&self, plan: &str) -> u32 {
        self.lookup(plan).link_limit
    }
}
