//! Sync enrichment contract: exactly one of success, definitive block, or
//! silent deferral to the async path.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use satchel_enrich::config::EnrichConfig;
use satchel_enrich::enrich::SyncEnricher;
use satchel_enrich::fetcher::BoundedFetcher;
use satchel_enrich::metrics::EnrichMetrics;
use satchel_enrich::security::SsrfValidator;

use common::{Route, TestServer};

fn build_enricher(config: &EnrichConfig) -> (SyncEnricher, Arc<EnrichMetrics>) {
    let fetcher = Arc::new(
        BoundedFetcher::with_validator(
            &config.fetch.user_agent,
            SsrfValidator::new().allow_host("127.0.0.1"),
        )
        .unwrap(),
    );
    let metrics = Arc::new(EnrichMetrics::new());
    (
        SyncEnricher::new(fetcher, config, metrics.clone()),
        metrics,
    )
}

const PAGE_WITH_IMAGE: &str = r#"<html><head>
<meta property="og:title" content="A Useful Article" />
<meta property="og:description" content="Short summary of the article." />
<meta property="og:image" content="https://cdn.example.com/hero.jpg" />
<title>fallback title</title>
</head><body><p>body</p></body></html>"#;

const PAGE_WITHOUT_IMAGE: &str = r#"<html><head>
<title>Plain Page</title>
<meta name="description" content="No preview image here." />
</head><body><p>body</p></body></html>"#;

#[tokio::test]
async fn test_success_when_preview_image_present() {
    let server = TestServer::start(HashMap::from([(
        "/article".to_string(),
        Route::Html(PAGE_WITH_IMAGE.to_string()),
    )]))
    .await;

    let config = EnrichConfig::default();
    let (enricher, metrics) = build_enricher(&config);
    let result = enricher.enrich(&server.url("/article"), "u1", "i1").await;

    assert_eq!(result.title.as_deref(), Some("A Useful Article"));
    assert_eq!(
        result.excerpt.as_deref(),
        Some("Short summary of the article.")
    );
    assert_eq!(
        result.preview_image_url.as_deref(),
        Some("https://cdn.example.com/hero.jpg")
    );
    assert!(!result.needs_async_fallback);
    assert!(result.error.is_none());
    assert!(result.duration > Duration::ZERO);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.sync_attempts, 1);
    assert_eq!(snapshot.sync_deferred, 0);
    assert_eq!(snapshot.sync_blocked, 0);
}

#[tokio::test]
async fn test_missing_preview_image_requests_async_fallback() {
    let server = TestServer::start(HashMap::from([(
        "/plain".to_string(),
        Route::Html(PAGE_WITHOUT_IMAGE.to_string()),
    )]))
    .await;

    let config = EnrichConfig::default();
    let (enricher, metrics) = build_enricher(&config);
    let result = enricher.enrich(&server.url("/plain"), "u1", "i1").await;

    // Metadata is still returned; only the thumbnail work is deferred.
    assert_eq!(result.title.as_deref(), Some("Plain Page"));
    assert_eq!(result.excerpt.as_deref(), Some("No preview image here."));
    assert!(result.preview_image_url.is_none());
    assert!(result.needs_async_fallback);
    assert!(result.error.is_none());
    assert_eq!(metrics.snapshot().sync_deferred, 1);
}

#[tokio::test]
async fn test_blocked_url_is_definitive() {
    let server = TestServer::start(HashMap::from([(
        "/page".to_string(),
        Route::Html(PAGE_WITH_IMAGE.to_string()),
    )]))
    .await;

    // Default validator blocks loopback, so the fixture itself is the
    // hostile address here.
    let config = EnrichConfig::default();
    let fetcher = Arc::new(BoundedFetcher::new(&config.fetch.user_agent).unwrap());
    let metrics = Arc::new(EnrichMetrics::new());
    let enricher = SyncEnricher::new(fetcher, &config, metrics.clone());

    let result = enricher.enrich(&server.url("/page"), "u1", "i1").await;

    assert_eq!(result.error.as_deref(), Some("URL blocked."));
    assert!(!result.needs_async_fallback);
    assert!(result.title.is_none());
    assert!(result.preview_image_url.is_none());
    assert_eq!(metrics.snapshot().sync_blocked, 1);
}

#[tokio::test]
async fn test_upstream_failure_defers_silently() {
    let server = TestServer::start(HashMap::from([("/err".to_string(), Route::Status(500))])).await;

    let config = EnrichConfig::default();
    let (enricher, metrics) = build_enricher(&config);
    let result = enricher.enrich(&server.url("/err"), "u1", "i1").await;

    assert!(result.needs_async_fallback);
    assert!(result.error.is_none());
    assert!(result.title.is_none());
    assert!(result.excerpt.is_none());
    assert_eq!(metrics.snapshot().sync_deferred, 1);
}

#[tokio::test]
async fn test_exhausted_budget_defers_silently() {
    let server = TestServer::start(HashMap::from([(
        "/slow".to_string(),
        Route::Slow {
            body: PAGE_WITH_IMAGE.to_string(),
            delay: Duration::from_secs(2),
        },
    )]))
    .await;

    let mut config = EnrichConfig::default();
    config.sync.total_budget_ms = 250;
    config.sync.fetch_budget_ms = 150;

    let (enricher, metrics) = build_enricher(&config);
    let result = enricher.enrich(&server.url("/slow"), "u1", "i1").await;

    assert!(result.needs_async_fallback);
    assert!(result.error.is_none());
    assert!(result.title.is_none());
    assert!(result.duration < Duration::from_secs(1));
    assert_eq!(metrics.snapshot().sync_deferred, 1);
}

#[tokio::test]
async fn test_title_is_sanitized_and_capped() {
    let long_title = "word ".repeat(60);
    let page = format!(
        "<html><head><title>  <b>{}</b>  </title></head><body></body></html>",
        long_title
    );
    let server = TestServer::start(HashMap::from([("/long".to_string(), Route::Html(page))])).await;

    let config = EnrichConfig::default();
    let (enricher, _) = build_enricher(&config);
    let result = enricher.enrich(&server.url("/long"), "u1", "i1").await;

    let title = result.title.unwrap();
    assert_eq!(title.chars().count(), 200);
    assert!(title.ends_with("..."));
    assert!(!title.contains('<'));
}
