//! Email delivery through the Mailgun HTTP API

use crate::config::MailgunConfig;
use crate::notify::{AlertMessage, DownAlert, Notifier, NotifyError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Environment variable consulted when the config carries no API key
pub const API_KEY_ENV: &str = "MAILGUN_API_KEY";

/// Sends down-alerts as email via `POST {api_base}/v3/{domain}/messages`
#[derive(Debug, Clone)]
pub struct MailgunNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    dashboard_url: Option<String>,
}

impl MailgunNotifier {
    /// Creates a notifier from its config section
    ///
    /// The API key falls back to `MAILGUN_API_KEY`; a missing key is an error
    /// rather than a notifier that fails on every alert.
    pub fn from_config(config: &MailgunConfig) -> Result<Self, NotifyError> {
        let api_key = match &config.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var(API_KEY_ENV).map_err(|_| {
                NotifyError::NotConfigured(format!(
                    "mailgun api-key not set and {} is missing",
                    API_KEY_ENV
                ))
            })?,
        };

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v3/{}/messages",
                config.api_base.trim_end_matches('/'),
                config.domain
            ),
            api_key,
            from: config
                .from
                .clone()
                .unwrap_or_else(|| format!("Linkwatch <alerts@{}>", config.domain)),
            dashboard_url: config.dashboard_url.clone(),
        })
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    async fn notify_down(&self, alert: &DownAlert) -> Result<(), NotifyError> {
        let message = AlertMessage::for_alert(alert, self.dashboard_url.as_deref());

        let form = [
            ("from", self.from.as_str()),
            ("to", alert.contact.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.body.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form[..])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Alert sent to {}", alert.contact);
        Ok(())
    }
}
