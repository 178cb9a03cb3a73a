use serde::Deserialize;

/// Main configuration structure for Linkwatch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(rename = "plan-defaults", default)]
    pub plan_defaults: PlanDefaults,
    #[serde(default)]
    pub plans: Vec<PlanEntry>,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Scheduling and probing behavior
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Period between batch passes (seconds)
    #[serde(rename = "check-period-secs", default = "default_check_period")]
    pub check_period_secs: u64,

    /// Delay inserted between consecutive checks in a batch pass (milliseconds)
    #[serde(rename = "inter-check-delay-ms", default = "default_inter_check_delay")]
    pub inter_check_delay_ms: u64,

    /// Upper bound on a single probe (seconds)
    #[serde(rename = "probe-timeout-secs", default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Number of check records returned by a history query
    #[serde(rename = "history-limit", default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_period_secs: default_check_period(),
            inter_check_delay_ms: default_inter_check_delay(),
            probe_timeout_secs: default_probe_timeout(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_check_period() -> u64 {
    600
}

fn default_inter_check_delay() -> u64 {
    1000
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_history_limit() -> u32 {
    100
}

/// Client identification sent with every probe
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the monitoring client
    #[serde(rename = "client-name")]
    pub client_name: String,

    /// Version of the monitoring client
    #[serde(rename = "client-version")]
    pub client_version: String,

    /// URL with information about the monitor
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.client_name, self.client_version, url),
            None => format!("{}/{}", self.client_name, self.client_version),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Fallback policy for plan identifiers not listed in `plans`
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDefaults {
    #[serde(rename = "check-interval-secs")]
    pub check_interval_secs: u64,

    #[serde(rename = "link-limit")]
    pub link_limit: u32,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            check_interval_secs: 4 * 3600,
            link_limit: 3,
        }
    }
}

/// A subscription tier and its monitoring policy
#[derive(Debug, Clone, Deserialize)]
pub struct PlanEntry {
    /// Plan identifier as stored on the user (e.g., "starter")
    pub name: String,

    /// Minimum time between scheduled checks of one link
    #[serde(rename = "check-interval-secs")]
    pub check_interval_secs: u64,

    /// Maximum number of active links per user
    #[serde(rename = "link-limit")]
    pub link_limit: u32,
}

/// Where down-alerts are delivered
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifierConfig {
    /// Write alerts to the log only
    #[default]
    Log,

    /// Send alerts as email through the Mailgun HTTP API
    Mailgun(MailgunConfig),
}

/// Mailgun delivery settings
#[derive(Debug, Clone, Deserialize)]
pub struct MailgunConfig {
    /// Sending domain registered with Mailgun
    pub domain: String,

    /// API key; read from `MAILGUN_API_KEY` when absent
    #[serde(rename = "api-key", default)]
    pub api_key: Option<String>,

    /// Base URL of the Mailgun API
    #[serde(rename = "api-base", default = "default_mailgun_base")]
    pub api_base: String,

    /// Sender address; defaults to `Linkwatch <alerts@{domain}>`
    #[serde(default)]
    pub from: Option<String>,

    /// Link included at the end of every alert
    #[serde(rename = "dashboard-url", default)]
    pub dashboard_url: Option<String>,
}

fn default_mailgun_base() -> String {
    "https://api.mailgun.net".to_string()
}
