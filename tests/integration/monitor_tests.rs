use crate::common::{add_user, create_test_config, field, form_fields, mailgun_notifier};
use linkwatch::config::{Config, NotifierConfig};
use linkwatch::monitor::Monitor;
use linkwatch::notify::build_notifier;
use linkwatch::output::load_statistics;
use linkwatch::state::LinkStatus;
use linkwatch::storage::{self, SharedStorage, SqliteStorage, Storage};
use linkwatch::LinkwatchError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAILGUN_PATH: &str = "/v3/mg.example.com/messages";

struct Setup {
    db_path: String,
    monitor: Monitor,
    storage: SharedStorage,
    _dir: TempDir,
}

fn setup(notifier: NotifierConfig) -> Setup {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("linkwatch.db").display().to_string();
    let config: Config = create_test_config(&db_path, notifier);

    let storage = storage::open_shared(Path::new(&db_path)).unwrap();
    let notifier = build_notifier(&config.notifier).unwrap();
    let monitor = Monitor::from_config(&config, storage.clone(), notifier).unwrap();

    Setup {
        db_path,
        monitor,
        storage,
        _dir: dir,
    }
}

async fn mount_site(site: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(site)
        .await;
}

async fn mount_mailgun(mailgun: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(MAILGUN_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(mailgun)
        .await;
}

async fn sent_alerts(mailgun: &MockServer) -> Vec<Vec<(String, String)>> {
    mailgun
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| form_fields(&request.body))
        .collect()
}

#[tokio::test]
async fn test_new_link_that_is_down_sends_one_email() {
    let site = MockServer::start().await;
    let mailgun = MockServer::start().await;
    mount_site(&site, "/bio", 503).await;
    mount_mailgun(&mailgun, 200).await;

    let s = setup(mailgun_notifier(&mailgun));
    let user_id = add_user(&s.storage, "owner@example.com", "starter");

    let added = s
        .monitor
        .add_link(user_id, &format!("{}/bio", site.uri()), Some("Bio"))
        .await
        .unwrap();

    assert_eq!(added.link.status, LinkStatus::Down);
    assert!(added.link.last_status_change.is_some());

    let alerts = sent_alerts(&mailgun).await;
    assert_eq!(alerts.len(), 1);

    let fields = &alerts[0];
    assert_eq!(field(fields, "to"), Some("owner@example.com"));
    assert_eq!(field(fields, "subject"), Some("Link Down: Bio"));
    assert_eq!(
        field(fields, "from"),
        Some("Linkwatch <alerts@mg.example.com>")
    );

    let text = field(fields, "text").unwrap();
    assert!(text.contains(&format!("{}/bio", site.uri())));
    assert!(text.contains("HTTP 503"));
    assert!(text.contains("https://app.example.com/dashboard"));
}

#[tokio::test]
async fn test_alert_once_per_outage_and_silent_recovery() {
    let site = MockServer::start().await;
    let mailgun = MockServer::start().await;
    mount_mailgun(&mailgun, 200).await;
    mount_site(&site, "/", 500).await;

    let s = setup(mailgun_notifier(&mailgun));
    let user_id = add_user(&s.storage, "owner@example.com", "pro");
    let link_id = s
        .monitor
        .add_link(user_id, &site.uri(), None)
        .await
        .unwrap()
        .link
        .id;

    // Still down: no further alerts
    s.monitor.check_one(link_id).await.unwrap();
    s.monitor.check_one(link_id).await.unwrap();
    assert_eq!(sent_alerts(&mailgun).await.len(), 1);

    // Recovery is silent
    site.reset().await;
    mount_site(&site, "/", 200).await;
    let result = s.monitor.check_one(link_id).await.unwrap().unwrap();
    assert!(result.is_up);
    assert_eq!(sent_alerts(&mailgun).await.len(), 1);

    // A new outage alerts again
    site.reset().await;
    mount_site(&site, "/", 502).await;
    s.monitor.check_one(link_id).await.unwrap();
    assert_eq!(sent_alerts(&mailgun).await.len(), 2);

    let history = s.monitor.history(link_id, None).unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].status_code, Some(502));
    assert!(history[1].is_up);
}

#[tokio::test]
async fn test_rejected_email_keeps_status_and_history() {
    let site = MockServer::start().await;
    let mailgun = MockServer::start().await;
    mount_site(&site, "/", 404).await;
    mount_mailgun(&mailgun, 500).await;

    let s = setup(mailgun_notifier(&mailgun));
    let user_id = add_user(&s.storage, "owner@example.com", "starter");

    let added = s.monitor.add_link(user_id, &site.uri(), None).await.unwrap();

    assert_eq!(sent_alerts(&mailgun).await.len(), 1);
    assert_eq!(added.link.status, LinkStatus::Down);
    assert_eq!(s.monitor.history(added.link.id, None).unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_pass_persists_and_is_idempotent() {
    let site = MockServer::start().await;
    mount_site(&site, "/up", 200).await;
    mount_site(&site, "/down", 500).await;

    let s = setup(NotifierConfig::Log);
    let user_id = add_user(&s.storage, "owner@example.com", "business");
    {
        let mut storage = storage::lock(&s.storage).unwrap();
        storage
            .insert_link(user_id, &format!("{}/up", site.uri()), Some("Up"))
            .unwrap();
        storage
            .insert_link(user_id, &format!("{}/down", site.uri()), None)
            .unwrap();
    }

    let first = s.monitor.check_all_due().await.unwrap();
    assert_eq!(first.checked_count, 2);
    assert_eq!(first.total_active, 2);

    let second = s.monitor.check_all_due().await.unwrap();
    assert_eq!(second.checked_count, 0);
    assert_eq!(site.received_requests().await.unwrap().len(), 2);

    // Everything is on disk for a fresh connection
    let reopened = SqliteStorage::new(Path::new(&s.db_path)).unwrap();
    let stats = load_statistics(&reopened).unwrap();
    assert_eq!(stats.total_checks, 2);
    assert_eq!(stats.count(LinkStatus::Up), 1);
    assert_eq!(stats.count(LinkStatus::Down), 1);
    assert_eq!(reopened.count_users().unwrap(), 1);
}

#[tokio::test]
async fn test_removed_link_is_no_longer_checked() {
    let site = MockServer::start().await;
    mount_site(&site, "/", 200).await;

    let s = setup(NotifierConfig::Log);
    let user_id = add_user(&s.storage, "owner@example.com", "starter");
    let link_id = s
        .monitor
        .add_link(user_id, &site.uri(), None)
        .await
        .unwrap()
        .link
        .id;

    s.monitor.remove_link(link_id).unwrap();

    assert_eq!(s.monitor.check_one(link_id).await.unwrap(), None);
    let summary = s.monitor.check_all_due().await.unwrap();
    assert_eq!(summary.total_active, 0);

    // History survives the soft delete
    assert_eq!(s.monitor.history(link_id, None).unwrap().len(), 1);
    assert_eq!(site.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_plan_limit_counts_active_links() {
    let site = MockServer::start().await;
    mount_site(&site, "/", 200).await;

    let s = setup(NotifierConfig::Log);
    let user_id = add_user(&s.storage, "owner@example.com", "starter");

    for i in 0..3 {
        s.monitor
            .add_link(user_id, &format!("{}/?n={}", site.uri(), i), None)
            .await
            .unwrap();
    }

    let result = s
        .monitor
        .add_link(user_id, &format!("{}/?n=3", site.uri()), None)
        .await;
    match result {
        Err(LinkwatchError::LinkLimitReached { plan, limit }) => {
            assert_eq!(plan, "starter");
            assert_eq!(limit, 3);
        }
        other => panic!("expected link limit error, got {:?}", other.map(|a| a.link.id)),
    }
}

#[tokio::test]
async fn test_link_operations_are_scoped_to_owner() {
    let site = MockServer::start().await;
    mount_site(&site, "/", 200).await;

    let s = setup(NotifierConfig::Log);
    let owner = add_user(&s.storage, "owner@example.com", "pro");
    let other = add_user(&s.storage, "other@example.com", "pro");

    let link_id = s
        .monitor
        .add_link(owner, &site.uri(), Some("Portfolio"))
        .await
        .unwrap()
        .link
        .id;

    assert!(matches!(
        s.monitor.check_link_for_user(other, link_id).await,
        Err(LinkwatchError::NotOwner { .. })
    ));
    assert!(matches!(
        s.monitor.remove_link_for_user(other, link_id),
        Err(LinkwatchError::NotOwner { .. })
    ));
    assert!(s.monitor.links_for_user(other).unwrap().is_empty());

    let listed = s.monitor.links_for_user(owner).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].display_name(), "Portfolio");

    s.monitor.rename_link(link_id, Some("Site")).unwrap();
    assert!(s.monitor.check_link_for_user(owner, link_id).await.unwrap().is_some());
    assert_eq!(s.monitor.history_for_user(owner, link_id, None).unwrap().len(), 2);

    s.monitor.remove_link_for_user(owner, link_id).unwrap();
    assert!(s.monitor.links_for_user(owner).unwrap().is_empty());
    // Only the owner's own initial and manual checks reached the site
    assert_eq!(site.received_requests().await.unwrap().len(), 2);
}
