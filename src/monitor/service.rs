//! Monitor: the entry points for scheduled and on-demand checks
//!
//! Both paths converge on the same gated sequence:
//! 1. Claim the link's permit from the [`LinkGate`]
//! 2. Re-read the link; skip it if missing, inactive, or (batch only) not due
//! 3. Probe the URL
//! 4. Record the result through the [`StatusTracker`]

use crate::config::{Config, PlanPolicy, PlanTable};
use crate::monitor::gate::LinkGate;
use crate::monitor::tracker::StatusTracker;
use crate::notify::Notifier;
use crate::probe::{ProbeResult, Prober};
use crate::storage::{self, CheckRecord, LinkRecord, MonitoredLink, SharedStorage, StorageError};
use crate::url::normalize_link_url;
use crate::{LinkwatchError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Pause between consecutive checks in a batch pass
pub const DEFAULT_INTER_CHECK_DELAY: Duration = Duration::from_secs(1);

/// Number of history records returned when no limit is given
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// Returns true if a link last checked at `last_checked` is due at `now`
///
/// Never-checked links are always due. A `last_checked` in the future (clock
/// skew) is treated as not due.
pub fn is_due(last_checked: Option<DateTime<Utc>>, interval: Duration, now: DateTime<Utc>) -> bool {
    match last_checked {
        None => true,
        Some(last) => match chrono::Duration::from_std(interval) {
            Ok(interval) => now - last >= interval,
            Err(_) => false,
        },
    }
}

/// Result of one batch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Links probed and recorded
    pub checked_count: usize,
    /// Due links whose check failed to record
    pub failed_count: usize,
    /// Active links seen at the start of the pass
    pub total_active: usize,
    /// True if shutdown cut the pass short
    pub interrupted: bool,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checked {}/{} active links",
            self.checked_count, self.total_active
        )?;
        if self.failed_count > 0 {
            write!(f, ", {} failed", self.failed_count)?;
        }
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}

/// A newly added link and the outcome of its initial check
#[derive(Debug, Clone, PartialEq)]
pub struct AddedLink {
    pub link: LinkRecord,
    pub initial_check: Option<ProbeResult>,
}

/// Monitoring core shared by the scheduler and on-demand callers
pub struct Monitor {
    storage: SharedStorage,
    prober: Prober,
    tracker: StatusTracker,
    plans: Arc<dyn PlanPolicy>,
    gate: LinkGate,
    inter_check_delay: Duration,
    history_limit: u32,
}

impl Monitor {
    /// Creates a monitor over explicit collaborators
    pub fn new(
        storage: SharedStorage,
        prober: Prober,
        notifier: Arc<dyn Notifier>,
        plans: Arc<dyn PlanPolicy>,
    ) -> Self {
        Self {
            tracker: StatusTracker::new(storage.clone(), notifier),
            storage,
            prober,
            plans,
            gate: LinkGate::new(),
            inter_check_delay: DEFAULT_INTER_CHECK_DELAY,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Creates a monitor with a reqwest prober and plan table from `config`
    pub fn from_config(
        config: &Config,
        storage: SharedStorage,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let prober = Prober::from_config(config)?;
        let plans = Arc::new(PlanTable::from_config(config));

        Ok(Self::new(storage, prober, notifier, plans)
            .with_inter_check_delay(Duration::from_millis(config.monitor.inter_check_delay_ms))
            .with_history_limit(config.monitor.history_limit))
    }

    pub fn with_inter_check_delay(mut self, delay: Duration) -> Self {
        self.inter_check_delay = delay;
        self
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    // ===== Trigger entry points =====

    /// Checks one link immediately, regardless of due-ness
    ///
    /// Returns `Ok(None)` if the link does not exist or is inactive.
    pub async fn check_one(&self, link_id: i64) -> Result<Option<ProbeResult>> {
        self.run_gated(link_id, None).await
    }

    /// Runs one batch pass over all active links
    pub async fn check_all_due(&self) -> Result<BatchSummary> {
        self.run_batch(None).await
    }

    /// Runs one batch pass, stopping between links once `shutdown` reads true
    pub async fn check_all_due_until(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<BatchSummary> {
        self.run_batch(Some(shutdown)).await
    }

    /// Adds a link for `user_id` and runs its initial check synchronously
    ///
    /// # Errors
    ///
    /// * `UrlError` - the URL cannot be normalized to http(s)
    /// * `UserNotFound` - no such user
    /// * `LinkLimitReached` - the user's plan allows no more active links
    pub async fn add_link(
        &self,
        user_id: i64,
        url: &str,
        name: Option<&str>,
    ) -> Result<AddedLink> {
        let url = normalize_link_url(url)?;
        let name = name.map(str::trim).filter(|name| !name.is_empty());

        let link_id = {
            let mut storage = storage::lock(&self.storage)?;
            let user = storage
                .get_user(user_id)?
                .ok_or(LinkwatchError::UserNotFound(user_id))?;

            let limit = self.plans.link_limit_for(&user.plan);
            if storage.count_active_links(user_id)? >= limit {
                return Err(LinkwatchError::LinkLimitReached {
                    plan: user.plan,
                    limit,
                });
            }

            storage.insert_link(user_id, url.as_str(), name)?
        };

        tracing::info!("Added link {} ({}) for user {}", link_id, url, user_id);

        let initial_check = self.check_one(link_id).await?;

        let link = {
            let storage = storage::lock(&self.storage)?;
            storage
                .get_link(link_id)?
                .ok_or(LinkwatchError::LinkNotFound(link_id))?
        };

        Ok(AddedLink {
            link,
            initial_check,
        })
    }

    /// Soft-deletes a link; its history is kept
    pub fn remove_link(&self, link_id: i64) -> Result<()> {
        let mut storage = storage::lock(&self.storage)?;
        if !storage.set_link_active(link_id, false)? {
            return Err(LinkwatchError::LinkNotFound(link_id));
        }
        tracing::info!("Deactivated link {}", link_id);
        Ok(())
    }

    /// Sets or clears a link's display name
    pub fn rename_link(&self, link_id: i64, name: Option<&str>) -> Result<()> {
        let name = name.map(str::trim).filter(|name| !name.is_empty());
        let mut storage = storage::lock(&self.storage)?;
        if !storage.rename_link(link_id, name)? {
            return Err(LinkwatchError::LinkNotFound(link_id));
        }
        Ok(())
    }

    /// Most recent checks for a link, newest first
    ///
    /// `limit` defaults to the configured history limit.
    pub fn history(&self, link_id: i64, limit: Option<u32>) -> Result<Vec<CheckRecord>> {
        let storage = storage::lock(&self.storage)?;
        if storage.get_link(link_id)?.is_none() {
            return Err(LinkwatchError::LinkNotFound(link_id));
        }
        Ok(storage.recent_checks(link_id, limit.unwrap_or(self.history_limit))?)
    }

    // ===== Owner-scoped operations =====

    /// Active links owned by `user_id`
    pub fn links_for_user(&self, user_id: i64) -> Result<Vec<LinkRecord>> {
        let storage = storage::lock(&self.storage)?;
        if storage.get_user(user_id)?.is_none() {
            return Err(LinkwatchError::UserNotFound(user_id));
        }
        Ok(storage.list_user_links(user_id)?)
    }

    /// [`Monitor::check_one`] on behalf of the link's owner
    pub async fn check_link_for_user(
        &self,
        user_id: i64,
        link_id: i64,
    ) -> Result<Option<ProbeResult>> {
        self.ensure_owner(user_id, link_id)?;
        self.check_one(link_id).await
    }

    /// [`Monitor::remove_link`] on behalf of the link's owner
    pub fn remove_link_for_user(&self, user_id: i64, link_id: i64) -> Result<()> {
        self.ensure_owner(user_id, link_id)?;
        self.remove_link(link_id)
    }

    /// [`Monitor::history`] on behalf of the link's owner
    pub fn history_for_user(
        &self,
        user_id: i64,
        link_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<CheckRecord>> {
        self.ensure_owner(user_id, link_id)?;
        self.history(link_id, limit)
    }

    // ===== Internals =====

    /// Fails with `LinkNotFound` or `NotOwner` unless `user_id` owns the link
    fn ensure_owner(&self, user_id: i64, link_id: i64) -> Result<()> {
        let storage = storage::lock(&self.storage)?;
        match storage.get_link(link_id)? {
            None => Err(LinkwatchError::LinkNotFound(link_id)),
            Some(link) if link.user_id != user_id => {
                tracing::warn!(
                    "User {} attempted to access link {} owned by user {}",
                    user_id,
                    link_id,
                    link.user_id
                );
                Err(LinkwatchError::NotOwner { link_id, user_id })
            }
            Some(_) => Ok(()),
        }
    }

    async fn run_batch(&self, shutdown: Option<&watch::Receiver<bool>>) -> Result<BatchSummary> {
        let now = Utc::now();
        let links = {
            let storage = storage::lock(&self.storage)?;
            storage.list_active_links()?
        };

        tracing::info!("Found {} active links to evaluate", links.len());

        let mut summary = BatchSummary {
            total_active: links.len(),
            ..BatchSummary::default()
        };
        let mut attempted = 0usize;

        for monitored in &links {
            if shutdown.map_or(false, |rx| *rx.borrow()) {
                tracing::info!("Shutdown requested, ending batch pass early");
                summary.interrupted = true;
                break;
            }

            let interval = self.plans.interval_for(&monitored.plan);
            if !is_due(monitored.link.last_checked, interval, now) {
                tracing::debug!(
                    "Skipping link {} - last checked {:?} (plan: {}, interval: {:?})",
                    monitored.link.id,
                    monitored.link.last_checked,
                    monitored.plan,
                    interval
                );
                continue;
            }

            if attempted > 0 && !self.inter_check_delay.is_zero() {
                tokio::time::sleep(self.inter_check_delay).await;
            }
            attempted += 1;

            match self.run_gated(monitored.link.id, Some(now)).await {
                Ok(Some(_)) => summary.checked_count += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Error checking link {}: {}", monitored.link.id, e);
                    summary.failed_count += 1;
                }
            }
        }

        tracing::info!("Batch pass complete: {}", summary);
        Ok(summary)
    }

    /// Runs one check while holding the link's permit
    ///
    /// With `due_at`, the link is re-read under the permit and skipped if a
    /// concurrent check already made it not due.
    async fn run_gated(
        &self,
        link_id: i64,
        due_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ProbeResult>> {
        let _permit = self.gate.acquire(link_id).await;

        let monitored = {
            let storage = storage::lock(&self.storage)?;
            storage.get_monitored_link(link_id)?
        };

        let monitored = match monitored {
            Some(monitored) if monitored.link.active => monitored,
            _ => {
                tracing::debug!("Link {} is missing or inactive, not checking", link_id);
                return Ok(None);
            }
        };

        if let Some(now) = due_at {
            let interval = self.plans.interval_for(&monitored.plan);
            if !is_due(monitored.link.last_checked, interval, now) {
                tracing::debug!("Link {} was checked concurrently, skipping", link_id);
                return Ok(None);
            }
        }

        self.probe_and_record(&monitored).await
    }

    async fn probe_and_record(&self, monitored: &MonitoredLink) -> Result<Option<ProbeResult>> {
        tracing::info!("Checking link {}: {}", monitored.link.id, monitored.link.url);

        let result = self.prober.probe(&monitored.link.url).await;

        match self.tracker.record_check(monitored, &result).await {
            Ok(_) => Ok(Some(result)),
            // Deactivated while the probe was in flight; the result is dropped
            Err(LinkwatchError::StorageError(StorageError::LinkInactive(_)))
            | Err(LinkwatchError::StorageError(StorageError::LinkNotFound(_))) => {
                tracing::debug!(
                    "Link {} went away during its check, result discarded",
                    monitored.link.id
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("prober", &self.prober)
            .field("inter_check_delay", &self.inter_check_delay)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}
