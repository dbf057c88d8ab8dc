//! Integration tests for the crawl lifecycle
//!
//! These tests use wiremock to stand in for the audit provider and run the
//! full submit, poll, fetch and store cycle end-to-end against SQLite.

use crawl_audit::config::{parse_config, Config, CrawlOptions, PollingConfig};
use crawl_audit::provider::HttpAuditProvider;
use crawl_audit::storage::{SqliteStore, TaskStateStore};
use crawl_audit::{CrawlCoordinator, CrawlError, FetchError, IssueCategory, SubmitError, TaskStatus};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TASK_ID: &str = "07281559-0695-0216-0000-c269be8b7592";

/// Creates a test configuration pointing at the mock provider
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    let mut config = parse_config(&format!(
        r#"
[provider]
base-url = "{}"
login = "audit@example.com"
password = "secret"

[crawl]
max-pages = 50

[output]
database-path = "{}"
"#,
        base_url,
        db_path.display()
    ))
    .expect("test config should be valid");

    config.polling = PollingConfig {
        interval: Duration::from_millis(10),
        max_attempts: 5,
    };
    config
}

fn coordinator(config: &Config, store: Arc<SqliteStore>) -> CrawlCoordinator {
    let provider = HttpAuditProvider::new(&config.provider).unwrap();
    CrawlCoordinator::new(Arc::new(provider), store, config.polling)
}

fn envelope(tasks: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status_code": 20000,
        "status_message": "Ok.",
        "tasks": tasks
    }))
}

async fn mount_task_post(server: &MockServer, task_status: u32) {
    let message = if task_status == 20100 {
        "Task Created."
    } else {
        "Invalid Field."
    };

    Mock::given(method("POST"))
        .and(path("/v3/on_page/task_post"))
        .and(basic_auth("audit@example.com", "secret"))
        .respond_with(envelope(json!([{
            "id": TASK_ID,
            "status_code": task_status,
            "status_message": message,
            "result": null
        }])))
        .mount(server)
        .await;
}

fn ready_listing(ids: &[&str]) -> ResponseTemplate {
    let entries: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "target": "example.com", "tag": null}))
        .collect();

    envelope(json!([{
        "id": "ready-listing",
        "status_code": 20000,
        "status_message": "Ok.",
        "result_count": entries.len(),
        "result": entries
    }]))
}

fn pages_response(items: Value) -> ResponseTemplate {
    envelope(json!([{
        "id": TASK_ID,
        "status_code": 20000,
        "status_message": "Ok.",
        "result": [{
            "crawl_progress": "finished",
            "items_count": items.as_array().map(|a| a.len()).unwrap_or(0),
            "items": items
        }]
    }]))
}

fn sample_pages() -> Value {
    json!([
        {
            "url": "https://example.com/",
            "status_code": 200,
            "onpage_score": 97.3,
            "size": 51234,
            "page_timing": {"duration_time": 812.0},
            "meta": {
                "title": "Example Domain",
                "description": "An example site",
                "htags": {"h1": [], "h2": ["News"]},
                "internal_links_count": 14,
                "external_links_count": 2,
                "broken_links_count": 0,
                "images_count": 6,
                "images_without_alt_count": 1,
                "content": {"plain_text_word_count": 430}
            },
            "checks": {
                "no_h1_tag": true,
                "is_http": true,
                "no_image_alt": false,
                "canonical": true
            }
        },
        {
            "url": "https://example.com/blog",
            "status_code": 200,
            "onpage_score": 58.1,
            "checks": {"high_loading_time": true, "is_redirect": false}
        }
    ])
}

#[tokio::test]
async fn test_full_crawl_lifecycle() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_task_post(&mock_server, 20100).await;

    // Not listed on the first check, listed from the second on
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&["another-task"]))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&["another-task", TASK_ID]))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(pages_response(sample_pages()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let coordinator = coordinator(&config, store.clone());

    let mut task = coordinator
        .start_crawl("Example.com", &config.crawl)
        .await
        .unwrap();
    assert_eq!(task.task_id(), TASK_ID);
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert_eq!(task.max_pages, 50);
    assert_eq!(store.task_status(TASK_ID).unwrap(), Some(TaskStatus::InProgress));

    let report = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(task.status(), TaskStatus::Complete);
    assert_eq!(report.total_pages, 2);
    assert_eq!(report.healthy_pages, 1);
    assert_eq!(report.pages_with_issues, 1);
    assert_eq!(report.total_pages, report.healthy_pages + report.pages_with_issues);
    // (97.3 + 58.1) / 2 = 77.7
    assert_eq!(report.average_score, 78);
    assert_eq!(report.total_errors, 3);
    assert_eq!(report.issue_count(IssueCategory::Seo), 1);
    assert_eq!(report.issue_count(IssueCategory::Security), 1);
    assert_eq!(report.issue_count(IssueCategory::Performance), 1);

    let home = &report.pages[0];
    assert_eq!(home.title.as_deref(), Some("Example Domain"));
    assert_eq!(home.word_count, 430);
    assert_eq!(home.load_time_ms, 812);
    assert_eq!(home.raw_checks.get("canonical"), Some(&true));

    assert_eq!(store.task_status(TASK_ID).unwrap(), Some(TaskStatus::Complete));
    assert_eq!(store.report_count(TASK_ID).unwrap(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    let pages_request = requests
        .iter()
        .find(|r| r.url.path() == "/v3/on_page/pages")
        .unwrap();
    let body: Value = serde_json::from_slice(&pages_request.body).unwrap();
    assert_eq!(body[0]["id"], TASK_ID);
    assert_eq!(body[0]["limit"], 50);
    assert_eq!(body[0]["filters"], json!([["status_code", "=", 200]]));
    assert_eq!(body[0]["order_by"], json!(["meta.in_sitemap,desc"]));

    let submit_request = requests
        .iter()
        .find(|r| r.url.path() == "/v3/on_page/task_post")
        .unwrap();
    let body: Value = serde_json::from_slice(&submit_request.body).unwrap();
    assert_eq!(body[0]["target"], "https://example.com");
    assert_eq!(body[0]["max_crawl_pages"], 50);
}

#[tokio::test]
async fn test_transient_poll_errors_are_absorbed() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("audit.db"));

    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&[TASK_ID]))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(pages_response(sample_pages()))
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let coordinator = coordinator(&config, store);

    let mut task = coordinator
        .resume_crawl(TASK_ID, "example.com", None, &CrawlOptions::default())
        .unwrap();
    let report = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total_pages, 2);

    let polls = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/v3/on_page/tasks_ready")
        .count();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn test_poll_budget_exhaustion_times_out() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("audit.db"));

    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&["another-task"]))
        .expect(5)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(pages_response(sample_pages()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let coordinator = coordinator(&config, store);

    let mut task = coordinator
        .resume_crawl(TASK_ID, "example.com", None, &CrawlOptions::default())
        .unwrap();
    let err = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::TimedOut { attempts: 5, .. }));
    assert_eq!(task.status(), TaskStatus::TimedOut);
}

#[tokio::test]
async fn test_empty_result_fails_crawl() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_task_post(&mock_server, 20100).await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&[TASK_ID]))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(pages_response(json!([])))
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let coordinator = coordinator(&config, store.clone());

    let mut task = coordinator
        .start_crawl("example.com", &config.crawl)
        .await
        .unwrap();
    let err = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Failed {
            reason: FetchError::EmptyResult { .. },
            ..
        }
    ));
    assert_eq!(task.status(), TaskStatus::Failed);
    assert_eq!(store.report_count(TASK_ID).unwrap(), 0);
    assert_eq!(store.task_status(TASK_ID).unwrap(), Some(TaskStatus::InProgress));
}

#[tokio::test]
async fn test_rejected_pages_request_fails_crawl() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_task_post(&mock_server, 20100).await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&[TASK_ID]))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(envelope(json!([{
            "id": TASK_ID,
            "status_code": 40602,
            "status_message": "Task In Queue.",
            "result": null
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let coordinator = coordinator(&config, store.clone());

    let mut task = coordinator
        .start_crawl("example.com", &config.crawl)
        .await
        .unwrap();
    let err = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        CrawlError::Failed {
            task_id,
            reason: FetchError::RemoteRejected { status_code, message },
        } => {
            assert_eq!(task_id, TASK_ID);
            assert_eq!(status_code, 40602);
            assert_eq!(message, "Task In Queue.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(task.status(), TaskStatus::Failed);
    assert_eq!(store.report_count(TASK_ID).unwrap(), 0);
    assert!(store.completed_report(TASK_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreadable_pages_response_fails_crawl() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_task_post(&mock_server, 20100).await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&[TASK_ID]))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let coordinator = coordinator(&config, store.clone());

    let mut task = coordinator
        .start_crawl("example.com", &config.crawl)
        .await
        .unwrap();
    let err = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Failed {
            reason: FetchError::NetworkFailure(_),
            ..
        }
    ));
    assert_eq!(task.status(), TaskStatus::Failed);
    assert_eq!(store.task_status(TASK_ID).unwrap(), Some(TaskStatus::InProgress));
}

#[tokio::test]
async fn test_rejected_submission() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_task_post(&mock_server, 40501).await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let coordinator = coordinator(&config, store.clone());

    let err = coordinator
        .start_crawl("example.com", &config.crawl)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::RemoteRejected {
            status_code: 40501,
            ..
        }
    ));
    assert_eq!(store.task_status(TASK_ID).unwrap(), None);
}

#[tokio::test]
async fn test_restart_reuses_stored_report() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("audit.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_task_post(&mock_server, 20100).await;
    Mock::given(method("GET"))
        .and(path("/v3/on_page/tasks_ready"))
        .respond_with(ready_listing(&[TASK_ID]))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/on_page/pages"))
        .respond_with(pages_response(sample_pages()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let first_report = {
        let store = Arc::new(SqliteStore::new(&db_path).unwrap());
        let coordinator = coordinator(&config, store);
        let mut task = coordinator
            .start_crawl("example.com", &config.crawl)
            .await
            .unwrap();
        coordinator
            .poll_until_done(&mut task, &CancellationToken::new())
            .await
            .unwrap()
    };

    // A fresh process with the same database
    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let coordinator = coordinator(&config, store.clone());
    let mut task = coordinator
        .resume_crawl(TASK_ID, "example.com", None, &config.crawl)
        .unwrap();
    let report = coordinator
        .poll_until_done(&mut task, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report, first_report);
    assert_eq!(task.status(), TaskStatus::Complete);
    assert_eq!(store.report_count(TASK_ID).unwrap(), 1);
    assert!(store.completed_report(TASK_ID).await.unwrap().is_some());
}
