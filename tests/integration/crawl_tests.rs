//! Integration tests for the feed crawler
//!
//! These tests use wiremock to serve listing, entry and article pages and
//! walk real feeds through the HTTP fetcher.

use evenflow::config::CrawlerConfig;
use evenflow::feed::{CrawlState, DepthBound, FeedReader, HtmlFeedReader, Recovery, Selectors};
use evenflow::fetch::{build_http_client, FetchError, HttpPageFetcher, PageFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn selectors() -> Selectors {
    Selectors::new("a.next", "ul.entries a", "article a")
}

fn fetcher() -> HttpPageFetcher {
    HttpPageFetcher::new(build_http_client(&CrawlerConfig::default()).unwrap())
}

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

fn listing(entries: &[&str], next: Option<&str>) -> String {
    let items: String = entries
        .iter()
        .map(|e| format!(r#"<li><a href="{}">{}</a></li>"#, e, e))
        .collect();
    let next = next
        .map(|n| format!(r#"<a class="next" href="{}">Next</a>"#, n))
        .unwrap_or_default();
    format!(
        r#"<html><body><nav><a href="/about">About</a></nav><ul class="entries">{}</ul>{}</body></html>"#,
        items, next
    )
}

fn entry(links: &[&str]) -> String {
    let items: String = links
        .iter()
        .map(|l| format!(r#"<article><a href="{}">{}</a></article>"#, l, l))
        .collect();
    format!("<html><body>{}<footer><a href=\"/\">Home</a></footer></body></html>", items)
}

/// Two-page feed: p1 -> {e1, e2}, next p2; p2 -> {e3}, no next
async fn mount_two_page_feed(server: &MockServer) {
    mount_html(server, "/p1", listing(&["/e1", "/e2"], Some("/p2"))).await;
    mount_html(server, "/p2", listing(&["/e3"], None)).await;
    mount_html(server, "/e1", entry(&["/l1"])).await;
    mount_html(server, "/e2", entry(&["/l2"])).await;
    mount_html(server, "/e3", entry(&["/l3"])).await;
}

#[tokio::test]
async fn test_fetcher_resolves_selected_links() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_page_feed(&server).await;

    let fetcher = fetcher();
    let (entries, next) = fetcher
        .fetch_listing(&format!("{}/p1", base), "ul.entries a", "a.next")
        .await
        .unwrap();
    assert_eq!(
        entries,
        vec![format!("{}/e1", base), format!("{}/e2", base)]
    );
    assert_eq!(next, Some(format!("{}/p2", base)));

    let none = fetcher
        .fetch_one(&format!("{}/p2", base), "a.next")
        .await
        .unwrap();
    assert_eq!(none, None);
}

#[tokio::test]
async fn test_fetcher_reports_http_status() {
    let server = MockServer::start().await;
    let result = fetcher()
        .fetch_many(&format!("{}/missing", server.uri()), "a")
        .await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_two_page_feed_end_to_end() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_page_feed(&server).await;

    let fetcher = fetcher();
    let first = HtmlFeedReader::new(
        "A",
        format!("{}/p1", base),
        selectors(),
        DepthBound::Pages(1),
        false,
    );

    // Step 1
    let step1 = first.fetch_links(&fetcher).await.unwrap();
    assert!(!step1.state.is_over);
    assert_eq!(step1.state.url().unwrap(), format!("{}/p2", base));
    assert_eq!(step1.state.depth().unwrap(), DepthBound::Pages(0));
    assert_eq!(step1.links.len(), 2);

    // Step 2
    let second = step1.next_reader.expect("feed should continue");
    let step2 = second.fetch_links(&fetcher).await.unwrap();
    assert!(step2.state.is_over);
    assert!(step2.next_reader.is_none());

    let mut all = step1.links;
    all.extend(step2.links);
    let mut harvested: Vec<_> = all
        .into_iter()
        .map(|(url, origin)| (url, origin.source, origin.fake))
        .collect();
    harvested.sort();
    assert_eq!(
        harvested,
        vec![
            (format!("{}/l1", base), format!("{}/e1", base), false),
            (format!("{}/l2", base), format!("{}/e2", base), false),
            (format!("{}/l3", base), format!("{}/e3", base), false),
        ]
    );
}

#[tokio::test]
async fn test_depth_zero_ignores_next_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_page_feed(&server).await;

    let reader = HtmlFeedReader::new(
        "A",
        format!("{}/p1", base),
        selectors(),
        DepthBound::Pages(0),
        false,
    );
    let step = reader.fetch_links(&fetcher()).await.unwrap();
    assert!(step.state.is_over);
    assert!(step.next_reader.is_none());
    assert_eq!(step.links.len(), 2);
}

#[tokio::test]
async fn test_recovered_reader_starts_at_checkpoint() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_page_feed(&server).await;

    let checkpoint = CrawlState::new("A", false, &format!("{}/p2", base), DepthBound::Pages(0));
    let mut reader = HtmlFeedReader::new(
        "A",
        format!("{}/p1", base),
        selectors(),
        DepthBound::Pages(1),
        false,
    );
    assert_eq!(reader.recover(&checkpoint).unwrap(), Recovery::Resumed);

    let step = reader.fetch_links(&fetcher()).await.unwrap();
    assert!(step.state.is_over);
    let links: Vec<_> = step.links.keys().cloned().collect();
    assert_eq!(links, vec![format!("{}/l3", base)]);
}

#[tokio::test]
async fn test_entry_failure_propagates_to_caller() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_html(&server, "/p1", listing(&["/e1", "/gone"], None)).await;
    mount_html(&server, "/e1", entry(&["/l1"])).await;

    let reader = HtmlFeedReader::new(
        "A",
        format!("{}/p1", base),
        selectors(),
        DepthBound::Unbounded,
        false,
    );
    let result = reader.fetch_links(&fetcher()).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}
