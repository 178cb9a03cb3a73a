//! Monitoring core: gated checks, status tracking and the batch scheduler

mod gate;
mod scheduler;
mod service;
#[cfg(test)]
mod testing;
mod tracker;

pub use gate::{LinkGate, LinkPermit};
pub use scheduler::{Scheduler, SchedulerHandle, DEFAULT_CHECK_PERIOD};
pub use service::{
    is_due, AddedLink, BatchSummary, Monitor, DEFAULT_HISTORY_LIMIT, DEFAULT_INTER_CHECK_DELAY,
};
pub use tracker::StatusTracker;
