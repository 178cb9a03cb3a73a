use linkwatch::config::{
    Config, MailgunConfig, MonitorConfig, NotifierConfig, PlanDefaults, StorageConfig,
    UserAgentConfig,
};
use linkwatch::storage::{self, SharedStorage};
use wiremock::MockServer;

pub const USER_AGENT: &str = "TestBot/1.0 (+https://example.com/bot)";

/// Creates a test configuration writing to `db_path`
pub fn create_test_config(db_path: &str, notifier: NotifierConfig) -> Config {
    Config {
        monitor: MonitorConfig {
            check_period_secs: 600,
            inter_check_delay_ms: 0, // No politeness delay in tests
            probe_timeout_secs: 1,
            history_limit: 100,
        },
        user_agent: UserAgentConfig {
            client_name: "TestBot".to_string(),
            client_version: "1.0".to_string(),
            contact_url: Some("https://example.com/bot".to_string()),
        },
        storage: StorageConfig {
            database_path: db_path.to_string(),
        },
        plan_defaults: PlanDefaults::default(),
        plans: vec![],
        notifier,
    }
}

/// Mailgun notifier config pointed at a mock server
pub fn mailgun_notifier(server: &MockServer) -> NotifierConfig {
    NotifierConfig::Mailgun(MailgunConfig {
        domain: "mg.example.com".to_string(),
        api_key: Some("key-test".to_string()),
        api_base: server.uri(),
        from: None,
        dashboard_url: Some("https://app.example.com/dashboard".to_string()),
    })
}

pub fn add_user(storage: &SharedStorage, email: &str, plan: &str) -> i64 {
    storage::lock(storage)
        .unwrap()
        .insert_user(email, plan)
        .unwrap()
}

/// Decodes the form fields of a captured Mailgun request
pub fn form_fields(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

pub fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
