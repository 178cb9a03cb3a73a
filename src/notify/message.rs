//! Down-alert text
//!
//! Alerts are plain text: subject, the affected link, the error type and its
//! human-readable detail, and when the failure was detected.

use crate::notify::DownAlert;
use crate::probe::error_detail;
use chrono::{DateTime, Utc};

/// Formats a detection time as e.g. `Mar 04, 2025 at 09:15 PM UTC`
pub fn format_detected_at(at: &DateTime<Utc>) -> String {
    at.format("%b %d, %Y at %I:%M %p UTC").to_string()
}

/// Rendered alert ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub error_type: String,
    pub error_detail: String,
    pub body: String,
}

impl AlertMessage {
    /// Renders `alert`, optionally ending with a link to the dashboard
    pub fn for_alert(alert: &DownAlert, dashboard_url: Option<&str>) -> Self {
        let error_type = alert
            .error_message
            .clone()
            .unwrap_or_else(|| "Unknown Error".to_string());
        let error_detail = error_detail(alert.error_message.as_deref());
        let subject = format!("Link Down: {}", alert.link_name);

        let mut body = format!(
            "One of your monitored links is currently down. Your visitors may be \
             getting an error instead of your content.\n\n\
             Affected link: {}\n\
             URL: {}\n\n\
             Error type: {}\n\
             Details: {}\n\n\
             Detected: {}\n",
            alert.link_name,
            alert.url,
            error_type,
            error_detail,
            format_detected_at(&alert.detected_at),
        );

        if let Some(dashboard) = dashboard_url {
            body.push_str(&format!("\nView dashboard: {}\n", dashboard));
        }

        Self {
            subject,
            error_type,
            error_detail,
            body,
        }
    }
}
