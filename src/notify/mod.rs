//! Notification sink for down-alerts
//!
//! The monitor only depends on [`Notifier`]. Delivery failures are reported
//! back as [`NotifyError`] so callers can log them; they never affect the
//! recorded check outcome.

mod mailgun;
mod message;

pub use mailgun::MailgunNotifier;
pub use message::{format_detected_at, AlertMessage};

use crate::config::NotifierConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while delivering an alert
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error sending alert: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Alert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notifier is not configured: {0}")]
    NotConfigured(String),
}

/// Everything a sink needs to tell a user their link went down
#[derive(Debug, Clone, PartialEq)]
pub struct DownAlert {
    /// Where to send the alert (the owner's email address)
    pub contact: String,
    /// Display name of the link, or its URL when unnamed
    pub link_name: String,
    pub url: String,
    /// Stored error message of the failing check (`"HTTP 503"`, ...)
    pub error_message: Option<String>,
    pub detected_at: DateTime<Utc>,
}

/// Delivery point for down-alerts
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one alert
    async fn notify_down(&self, alert: &DownAlert) -> Result<(), NotifyError>;
}

/// Sink that writes alerts to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_down(&self, alert: &DownAlert) -> Result<(), NotifyError> {
        let message = AlertMessage::for_alert(alert, None);
        tracing::warn!("{} -> {}: {}", message.subject, alert.contact, message.error_detail);
        Ok(())
    }
}

/// Builds the configured notifier
pub fn build_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match config {
        NotifierConfig::Log => Ok(Arc::new(LogNotifier)),
        NotifierConfig::Mailgun(mailgun) => Ok(Arc::new(MailgunNotifier::from_config(mailgun)?)),
    }
}
