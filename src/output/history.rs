use crate::storage::{CheckRecord, LinkRecord, Storage};
use crate::LinkwatchError;

/// Reads a link and its `limit` most recent checks straight from storage
pub fn load_history(
    storage: &dyn Storage,
    link_id: i64,
    limit: u32,
) -> Result<(LinkRecord, Vec<CheckRecord>), LinkwatchError> {
    let link = storage
        .get_link(link_id)?
        .ok_or(LinkwatchError::LinkNotFound(link_id))?;
    let checks = storage.recent_checks(link_id, limit)?;
    Ok((link, checks))
}

/// Formats one check as a single report line
///
/// e.g. `2026-10-19 14:05:00 UTC  UP    HTTP 200  0.142s`
pub fn format_check_line(check: &CheckRecord) -> String {
    let state = if check.is_up { "UP" } else { "DOWN" };
    let code = match check.status_code {
        Some(code) => format!("HTTP {}", code),
        None => "-".to_string(),
    };

    let mut line = format!(
        "{}  {:<4}  {:<8}  {:.3}s",
        check.checked_at.format("%Y-%m-%d %H:%M:%S UTC"),
        state,
        code,
        check.latency_secs
    );
    if let Some(error) = &check.error_message {
        line.push_str("  ");
        line.push_str(error);
    }
    line
}

/// Formats one link as `#id  STATUS  name  url`
pub fn format_link_line(link: &LinkRecord) -> String {
    let checked = match link.last_checked {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never checked".to_string(),
    };
    format!(
        "#{:<5} {:<7}  {}  {}  ({})",
        link.id,
        link.status.to_string().to_uppercase(),
        link.display_name(),
        link.url,
        checked
    )
}

/// Prints a link header followed by its checks, newest first
pub fn print_history(link: &LinkRecord, checks: &[CheckRecord]) {
    println!("=== {} ===", link.display_name());
    println!("URL: {}", link.url);
    println!("Status: {}", link.status);
    if let Some(changed) = link.last_status_change {
        println!("Status since: {}", changed.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if !link.active {
        println!("(monitoring disabled)");
    }
    println!();

    if checks.is_empty() {
        println!("No checks recorded.");
        return;
    }

    for check in checks {
        println!("{}", format_check_line(check));
    }
}
