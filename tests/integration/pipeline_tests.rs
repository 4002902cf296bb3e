//! Integration tests for full crawl runs
//!
//! Each test serves feeds from a wiremock server and runs the whole
//! crawl -> delivery queue -> SQLite path against a temporary database.

use evenflow::config::{Config, CrawlerConfig, FeedEntry, StorageConfig};
use evenflow::feed::{FailureDecision, FeedStatus, Selectors};
use evenflow::runner::run_crawl;
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn page(class: &str, hrefs: &[&str], next: Option<&str>) -> String {
    let links: String = hrefs
        .iter()
        .map(|h| format!(r#"<a class="{}" href="{}">{}</a>"#, class, h, h))
        .collect();
    let next = next
        .map(|n| format!(r#"<a class="next" href="{}">Next</a>"#, n))
        .unwrap_or_default();
    format!("<html><body>{}{}</body></html>", links, next)
}

fn feed(name: &str, url: String, stop_after: Option<u32>) -> FeedEntry {
    FeedEntry {
        name: name.to_string(),
        url,
        stop_after,
        fake: false,
        selectors: Selectors::new("a.next", "a.entry", "a.article"),
    }
}

fn config(db: &Path, feeds: Vec<FeedEntry>, on_fetch_error: FailureDecision) -> Config {
    Config {
        storage: StorageConfig {
            database_path: db.to_string_lossy().to_string(),
            pool_size: 2,
        },
        crawler: CrawlerConfig {
            link_workers: 2,
            request_timeout_secs: 5,
            user_agent: "evenflow-test".to_string(),
            on_fetch_error,
        },
        feeds,
    }
}

fn count(db: &Path, sql: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

/// p1 -> {e1, e2}, next p2; p2 -> {e3}
async fn mount_feed(server: &MockServer) {
    mount_html(server, "/p1", page("entry", &["/e1", "/e2"], Some("/p2"))).await;
    mount_html(server, "/p2", page("entry", &["/e3"], None)).await;
    mount_html(server, "/e1", page("article", &["/l1"], None)).await;
    mount_html(server, "/e2", page("article", &["/l2"], None)).await;
    mount_html(server, "/e3", page("article", &["/l3"], None)).await;
}

#[tokio::test]
async fn test_run_stores_articles_and_checkpoints() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("run.db");

    let config = config(
        &db,
        vec![feed("A", format!("{}/p1", server.uri()), Some(1))],
        FailureDecision::Abort,
    );
    let report = run_crawl(&config, "hash", false).await.unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].status, FeedStatus::Completed);
    assert_eq!(report.outcomes[0].pages, 2);
    assert_eq!(report.outcomes[0].links, 3);
    assert_eq!(report.stats.articles_stored, 3);
    assert_eq!(report.stats.batches_acknowledged, 2);
    assert_eq!(report.stats.articles_diverted, 0);

    assert_eq!(count(&db, "SELECT COUNT(*) FROM article"), 3);
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM article WHERE source LIKE '%/e3' AND url LIKE '%/l3'"),
        1
    );
    assert_eq!(
        count(&db, "SELECT is_over FROM feed_state WHERE name = 'A'"),
        1
    );
}

#[tokio::test]
async fn test_finished_feed_is_skipped_on_next_run() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("rerun.db");

    let config = config(
        &db,
        vec![feed("A", format!("{}/p1", server.uri()), Some(1))],
        FailureDecision::Abort,
    );
    run_crawl(&config, "hash", false).await.unwrap();

    let second = run_crawl(&config, "hash", false).await.unwrap();
    assert_eq!(second.outcomes[0].status, FeedStatus::Skipped);
    assert_eq!(second.stats.batches_acknowledged, 0);

    // A fresh run crawls again; every article is already stored
    let fresh = run_crawl(&config, "hash", true).await.unwrap();
    assert_eq!(fresh.outcomes[0].status, FeedStatus::Completed);
    assert_eq!(fresh.stats.articles_stored, 0);
    assert_eq!(fresh.stats.articles_diverted, 3);
    assert_eq!(fresh.stats.errors_stored, 3);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM article"), 3);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM error"), 3);
}

#[tokio::test]
async fn test_suspended_feed_resumes_at_failed_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("suspend.db");

    // p2 is not served yet
    mount_html(&server, "/p1", page("entry", &["/e1"], Some("/p2"))).await;
    mount_html(&server, "/e1", page("article", &["/l1"], None)).await;

    let config = config(
        &db,
        vec![feed("A", format!("{}/p1", server.uri()), None)],
        FailureDecision::Suspend,
    );
    let first = run_crawl(&config, "hash", false).await.unwrap();
    assert_eq!(first.outcomes[0].status, FeedStatus::Suspended);
    assert_eq!(first.outcomes[0].pages, 1);
    assert_eq!(count(&db, "SELECT is_over FROM feed_state WHERE name = 'A'"), 0);

    mount_html(&server, "/p2", page("entry", &["/e2"], None)).await;
    mount_html(&server, "/e2", page("article", &["/l2"], None)).await;

    let second = run_crawl(&config, "hash", false).await.unwrap();
    assert_eq!(second.outcomes[0].status, FeedStatus::Completed);
    assert_eq!(second.outcomes[0].pages, 1);
    assert_eq!(second.stats.articles_stored, 1);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM article"), 2);
}

#[tokio::test]
async fn test_aborted_feed_does_not_stop_others() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("abort.db");

    let config = config(
        &db,
        vec![
            feed("broken", format!("{}/nowhere", server.uri()), Some(3)),
            feed("A", format!("{}/p1", server.uri()), Some(1)),
        ],
        FailureDecision::Abort,
    );
    let report = run_crawl(&config, "hash", false).await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "broken");
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].feed, "A");
    assert_eq!(count(&db, "SELECT COUNT(*) FROM article"), 3);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM feed_state WHERE name = 'broken'"), 0);
}
