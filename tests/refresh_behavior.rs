//! Behavior tests for the refresh job wired to the real GetItems adapter.
//!
//! The HTTP transport is a recording double, so nothing leaves the process.

use std::sync::Arc;

use serde_json::json;
use shelfcache_core::{
    Asin, BatchCache, CachedBatch, FsBlobStore, HttpError, HttpResponse, MemoryBlobStore,
    PaApiClient, PaApiConfig, RecordingHttpClient, RefreshJob, RefreshStatus, SyncError,
};
use tempfile::tempdir;
use time::OffsetDateTime;

fn asins(values: &[&str]) -> Vec<Asin> {
    values
        .iter()
        .map(|value| Asin::parse(value).expect("valid asin"))
        .collect()
}

fn configured() -> PaApiConfig {
    PaApiConfig::default().with_credentials("AKIDEXAMPLE", "secret", "shop-20")
}

fn widget_response() -> String {
    json!({
        "ItemsResult": {
            "Items": [{
                "ASIN": "B000000001",
                "DetailPageURL": "https://www.amazon.com/dp/B000000001?tag=shop-20",
                "Images": { "Primary": { "Large": { "URL": "https://m.media-amazon.com/w.jpg" } } },
                "ItemInfo": {
                    "Title": { "DisplayValue": "Widget" },
                    "ByLineInfo": { "Brand": { "DisplayValue": "Acme" } }
                },
                "Offers": {
                    "Listings": [{
                        "Price": { "DisplayAmount": "$9.99", "Amount": 9.99, "Currency": "USD" }
                    }]
                }
            }]
        }
    })
    .to_string()
}

fn job_with(
    config: PaApiConfig,
    http: Arc<RecordingHttpClient>,
    cache: BatchCache,
    asin_list: &[&str],
) -> RefreshJob {
    let client = PaApiClient::with_http_client(config, http);
    RefreshJob::new(Arc::new(client), cache, asins(asin_list))
}

fn previous_batch() -> CachedBatch {
    CachedBatch::new(Vec::new(), 1_600_000_000_000)
}

// =============================================================================
// Refresh: success path
// =============================================================================

#[tokio::test]
async fn when_upstream_answers_the_batch_is_replaced_and_persisted() {
    // Given: a file-backed cache and a healthy upstream
    let dir = tempdir().expect("temp dir");
    let cache = BatchCache::new(Arc::new(FsBlobStore::new(dir.path())));
    let http = Arc::new(RecordingHttpClient::ok_json(widget_response()));
    let job = job_with(configured(), http.clone(), cache.clone(), &["B000000001"]);

    // When: the job runs
    let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("timestamp");
    let report = job.run_at(now).await.expect("refresh succeeds");

    // Then: one signed call was made and the batch landed on disk
    assert_eq!(report.status, RefreshStatus::Written);
    assert_eq!(report.count, 1);
    assert_eq!(http.recorded_requests().len(), 1);
    assert!(http.recorded_requests()[0]
        .header("authorization")
        .is_some_and(|value| value.starts_with("AWS4-HMAC-SHA256 ")));

    let reopened = BatchCache::new(Arc::new(FsBlobStore::new(dir.path())));
    let stored = reopened.read().await.expect("read").expect("batch present");
    assert_eq!(stored.updated_at, 1_700_000_000_000);
    assert_eq!(stored.ttl_seconds, 3_600);
    assert_eq!(stored.items.len(), 1);

    let item = &stored.items[0];
    assert_eq!(item.title, "Widget");
    assert_eq!(item.brand.as_deref(), Some("Acme"));
    assert_eq!(item.price.as_deref(), Some("$9.99"));
    assert_eq!(item.currency.as_deref(), Some("USD"));
    assert!(item.in_stock);
    assert!(item.show_price);
    assert!(!item.show_rating);
}

// =============================================================================
// Refresh: no-op and failure paths
// =============================================================================

#[tokio::test]
async fn when_no_asins_are_configured_nothing_is_called_or_written() {
    // Given: an empty ASIN list
    let http = Arc::new(RecordingHttpClient::ok_json(widget_response()));
    let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
    let job = job_with(configured(), http.clone(), cache.clone(), &[]);

    // When
    let report = job.run().await.expect("no-op succeeds");

    // Then
    assert_eq!(report.status, RefreshStatus::Skipped);
    assert!(http.recorded_requests().is_empty());
    assert_eq!(cache.read().await.expect("read"), None);
}

#[tokio::test]
async fn when_credentials_are_missing_no_network_call_is_made() {
    // Given: no partner tag configured and a previous batch in the cache
    let mut config = configured();
    config.partner_tag = None;
    let http = Arc::new(RecordingHttpClient::ok_json(widget_response()));
    let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
    cache.write(&previous_batch()).await.expect("seed");
    let job = job_with(config, http.clone(), cache.clone(), &["B000000001"]);

    // When
    let err = job.run().await.expect_err("configuration error");

    // Then: the error names the setting and the cache is untouched
    assert!(matches!(err, SyncError::Config(_)));
    assert!(err.to_string().contains("AMAZON_ASSOCIATE_TAG"));
    assert!(http.recorded_requests().is_empty());
    assert_eq!(cache.read().await.expect("read"), Some(previous_batch()));
}

#[tokio::test]
async fn when_upstream_reports_errors_the_previous_batch_survives() {
    // Given: an upstream answering 200 with an Errors list
    let body = json!({
        "Errors": [{ "Code": "InvalidParameterValue", "Message": "bad ASIN" }]
    })
    .to_string();
    let http = Arc::new(RecordingHttpClient::ok_json(body));
    let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
    cache.write(&previous_batch()).await.expect("seed");
    let job = job_with(configured(), http, cache.clone(), &["B000000001"]);

    // When
    let err = job.run().await.expect_err("reported error");

    // Then
    assert_eq!(err.code(), "upstream.reported");
    assert_eq!(cache.read().await.expect("read"), Some(previous_batch()));
}

#[tokio::test]
async fn when_upstream_throttles_the_previous_batch_survives() {
    let body = json!({ "Errors": [{ "Code": "TooManyRequests", "Message": "slow down" }] });
    let http = Arc::new(RecordingHttpClient::responding(Ok(HttpResponse::with_status(
        429,
        body.to_string(),
    ))));
    let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
    cache.write(&previous_batch()).await.expect("seed");
    let job = job_with(configured(), http, cache.clone(), &["B000000001"]);

    let err = job.run().await.expect_err("throttled");

    assert_eq!(err.code(), "upstream.status");
    assert_eq!(cache.read().await.expect("read"), Some(previous_batch()));
}

#[tokio::test]
async fn when_the_transport_fails_the_previous_batch_survives() {
    let http = Arc::new(RecordingHttpClient::responding(Err(HttpError::new(
        "connection reset",
    ))));
    let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
    cache.write(&previous_batch()).await.expect("seed");
    let job = job_with(configured(), http, cache.clone(), &["B000000001"]);

    let err = job.run().await.expect_err("transport failure");

    assert_eq!(err.code(), "upstream.transport");
    assert_eq!(cache.read().await.expect("read"), Some(previous_batch()));
}
