//! Status tracker: applies check results and raises down-alerts

use crate::notify::{DownAlert, Notifier};
use crate::probe::ProbeResult;
use crate::storage::{self, AppliedCheck, MonitoredLink, NewCheck, SharedStorage};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;

/// Records check results and notifies on transitions into `Down`
///
/// Each result is written through [`Storage::apply_check`](crate::storage::Storage::apply_check),
/// so the history row and the status fields land together or not at all. The
/// alert is sent after the write commits; a failed alert is logged and never
/// undoes the write.
#[derive(Clone)]
pub struct StatusTracker {
    storage: SharedStorage,
    notifier: Arc<dyn Notifier>,
}

impl StatusTracker {
    pub fn new(storage: SharedStorage, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }

    /// Records `result` for `link` and alerts if the link just went down
    pub async fn record_check(
        &self,
        link: &MonitoredLink,
        result: &ProbeResult,
    ) -> Result<AppliedCheck> {
        let check = NewCheck::from_probe(result, Utc::now());

        let applied = {
            let mut storage = storage::lock(&self.storage)?;
            storage.apply_check(link.link.id, &check)?
        };

        let transition = applied.transition;
        if transition.recovered() {
            tracing::info!("Link {} ({}) recovered", link.link.id, link.link.url);
        } else if transition.is_change() {
            tracing::info!(
                "Link {} ({}) changed from {} to {}",
                link.link.id,
                link.link.url,
                transition.from,
                transition.to
            );
        }

        if applied.went_down() {
            self.send_down_alert(link, &applied).await;
        }

        Ok(applied)
    }

    async fn send_down_alert(&self, link: &MonitoredLink, applied: &AppliedCheck) {
        let alert = DownAlert {
            contact: link.contact.clone(),
            link_name: link.link.display_name().to_string(),
            url: link.link.url.clone(),
            error_message: applied.record.error_message.clone(),
            detected_at: applied.record.checked_at,
        };

        if let Err(e) = self.notifier.notify_down(&alert).await {
            tracing::error!(
                "Failed to send down alert for link {} to {}: {}",
                link.link.id,
                link.contact,
                e
            );
        }
    }
}
