use crate::config::types::{
    Config, MonitorConfig, NotifierConfig, PlanDefaults, PlanEntry, StorageConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Shortest check interval a plan may configure (seconds)
const MIN_CHECK_INTERVAL_SECS: u64 = 60;

/// Longest probe timeout accepted (seconds)
const MAX_PROBE_TIMEOUT_SECS: u64 = 120;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_monitor_config(&config.monitor)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_plan_defaults(&config.plan_defaults)?;
    validate_plans(&config.plans)?;
    validate_notifier_config(&config.notifier)?;
    Ok(())
}

fn validate_monitor_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    if config.check_period_secs < 1 {
        return Err(ConfigError::Validation(
            "check_period_secs must be >= 1".to_string(),
        ));
    }

    if config.probe_timeout_secs < 1 || config.probe_timeout_secs > MAX_PROBE_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "probe_timeout_secs must be between 1 and {}, got {}",
            MAX_PROBE_TIMEOUT_SECS, config.probe_timeout_secs
        )));
    }

    if config.history_limit < 1 {
        return Err(ConfigError::Validation(
            "history_limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.client_name.is_empty() {
        return Err(ConfigError::Validation(
            "client_name cannot be empty".to_string(),
        ));
    }

    if !config
        .client_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "client_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.client_name
        )));
    }

    if config.client_version.is_empty() {
        return Err(ConfigError::Validation(
            "client_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_plan_defaults(defaults: &PlanDefaults) -> Result<(), ConfigError> {
    validate_interval("plan-defaults", defaults.check_interval_secs)
}

fn validate_plans(plans: &[PlanEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for plan in plans {
        if plan.name.is_empty() {
            return Err(ConfigError::Validation(
                "plan name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(plan.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "plan '{}' is defined more than once",
                plan.name
            )));
        }

        validate_interval(&plan.name, plan.check_interval_secs)?;
    }

    Ok(())
}

fn validate_interval(plan: &str, secs: u64) -> Result<(), ConfigError> {
    if secs < MIN_CHECK_INTERVAL_SECS {
        return Err(ConfigError::Validation(format!(
            "check_interval_secs for '{}' must be >= {}, got {}",
            plan, MIN_CHECK_INTERVAL_SECS, secs
        )));
    }
    Ok(())
}

fn validate_notifier_config(config: &NotifierConfig) -> Result<(), ConfigError> {
    match config {
        NotifierConfig::Log => Ok(()),
        NotifierConfig::Mailgun(mailgun) => {
            if mailgun.domain.is_empty() {
                return Err(ConfigError::Validation(
                    "mailgun domain cannot be empty".to_string(),
                ));
            }

            Url::parse(&mailgun.api_base)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api-base: {}", e)))?;

            if let Some(dashboard) = &mailgun.dashboard_url {
                Url::parse(dashboard).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid dashboard-url: {}", e))
                })?;
            }

            Ok(())
        }
    }
}
