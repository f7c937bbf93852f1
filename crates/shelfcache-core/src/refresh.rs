//! Scheduled price refresh.
//!
//! One run fetches every configured ASIN, normalizes the items and replaces
//! the cached batch. Any failure leaves the previous batch in place; the next
//! scheduled run is the only retry.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;

use crate::adapters::{CatalogSource, GetItemsRequest};
use crate::cache::BatchCache;
use crate::domain::epoch_millis;
use crate::normalize::normalize_item;
use crate::{Asin, CachedBatch, NormalizedItem, SyncError};

/// Schedule expression handed to the hosting platform's scheduler.
pub const REFRESH_SCHEDULE: &str = "@hourly";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Written,
    Skipped,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub run_id: String,
    pub status: RefreshStatus,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[derive(Clone)]
pub struct RefreshJob {
    source: Arc<dyn CatalogSource>,
    cache: BatchCache,
    asins: Vec<Asin>,
}

impl RefreshJob {
    pub fn new(source: Arc<dyn CatalogSource>, cache: BatchCache, asins: Vec<Asin>) -> Self {
        Self {
            source,
            cache,
            asins,
        }
    }

    pub fn asins(&self) -> &[Asin] {
        &self.asins
    }

    pub async fn run(&self) -> Result<RefreshReport, SyncError> {
        self.run_at(OffsetDateTime::now_utc()).await
    }

    /// Run once, stamping the batch with `now`.
    pub async fn run_at(&self, now: OffsetDateTime) -> Result<RefreshReport, SyncError> {
        let run_id = Uuid::new_v4().to_string();

        if self.asins.is_empty() {
            info!(%run_id, "no ASINs configured; skipping refresh");
            return Ok(RefreshReport {
                run_id,
                status: RefreshStatus::Skipped,
                count: 0,
                updated_at: None,
            });
        }

        info!(%run_id, asin_count = self.asins.len(), "refresh started");
        match self.fetch_and_store(now).await {
            Ok(batch) => {
                info!(%run_id, count = batch.items.len(), "refresh wrote batch");
                Ok(RefreshReport {
                    run_id,
                    status: RefreshStatus::Written,
                    count: batch.items.len(),
                    updated_at: Some(batch.updated_at),
                })
            }
            Err(err) => {
                error!(%run_id, code = err.code(), error = %err, "refresh failed; keeping previous batch");
                Err(err)
            }
        }
    }

    async fn fetch_and_store(&self, now: OffsetDateTime) -> Result<CachedBatch, SyncError> {
        let mut seen = HashSet::new();
        let mut items: Vec<NormalizedItem> = Vec::with_capacity(self.asins.len());

        for request in GetItemsRequest::chunked(&self.asins) {
            let fetched = self.source.get_items(&request).await?;
            for upstream in &fetched {
                if seen.insert(upstream.asin.clone()) {
                    items.push(normalize_item(upstream));
                }
            }
        }

        let batch = CachedBatch::new(items, epoch_millis(now));
        self.cache.write(&batch).await?;
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::normalize::UpstreamItem;
    use crate::storage::MemoryBlobStore;
    use crate::UpstreamError;

    /// Serves one canned item per requested ASIN, or fails every call.
    struct ScriptedSource {
        fail: bool,
        calls: Mutex<Vec<usize>>,
    }

    impl ScriptedSource {
        fn healthy() -> Self {
            Self {
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_sizes(&self) -> Vec<usize> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl CatalogSource for ScriptedSource {
        fn get_items<'a>(
            &'a self,
            request: &'a GetItemsRequest,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<UpstreamItem>, SyncError>> + Send + 'a>>
        {
            self.calls
                .lock()
                .expect("calls lock")
                .push(request.item_ids().len());
            let result = if self.fail {
                Err(UpstreamError::Reported {
                    count: 1,
                    code: String::from("InternalFailure"),
                    message: String::from("boom"),
                }
                .into())
            } else {
                Ok(request
                    .item_ids()
                    .iter()
                    .map(|asin| {
                        serde_json::from_value(serde_json::json!({ "ASIN": asin.as_str() }))
                            .expect("item decodes")
                    })
                    .collect())
            };
            Box::pin(async move { result })
        }
    }

    fn asins(count: usize) -> Vec<Asin> {
        (0..count)
            .map(|n| Asin::parse(&format!("B{n:09}")).expect("valid asin"))
            .collect()
    }

    #[tokio::test]
    async fn empty_asin_list_is_a_successful_no_op() {
        let source = Arc::new(ScriptedSource::healthy());
        let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
        let job = RefreshJob::new(source.clone(), cache.clone(), Vec::new());

        let report = job.run().await.expect("no-op succeeds");

        assert_eq!(report.status, RefreshStatus::Skipped);
        assert_eq!(report.count, 0);
        assert!(source.call_sizes().is_empty());
        assert_eq!(cache.read().await.expect("read"), None);
    }

    #[tokio::test]
    async fn long_lists_are_fetched_in_chunks_and_written_once() {
        let source = Arc::new(ScriptedSource::healthy());
        let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
        let job = RefreshJob::new(source.clone(), cache.clone(), asins(12));

        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("timestamp");
        let report = job.run_at(now).await.expect("refresh succeeds");

        assert_eq!(source.call_sizes(), vec![10, 2]);
        assert_eq!(report.status, RefreshStatus::Written);
        assert_eq!(report.count, 12);
        assert_eq!(report.updated_at, Some(1_700_000_000_000));

        let stored = cache.read().await.expect("read").expect("written");
        assert_eq!(stored.ttl_seconds, 3_600);
        assert_eq!(stored.items[0].asin.as_str(), "B000000000");
        assert_eq!(stored.items[11].asin.as_str(), "B000000011");
    }

    #[tokio::test]
    async fn failure_keeps_previous_batch() {
        let cache = BatchCache::new(Arc::new(MemoryBlobStore::new()));
        let previous = CachedBatch::new(Vec::new(), 42);
        cache.write(&previous).await.expect("seed");

        let job = RefreshJob::new(Arc::new(ScriptedSource::failing()), cache.clone(), asins(3));
        let err = job.run().await.expect_err("upstream failure");

        assert_eq!(err.code(), "upstream.reported");
        assert_eq!(cache.read().await.expect("read"), Some(previous));
    }

    #[test]
    fn report_serializes_camel_case() {
        let report = RefreshReport {
            run_id: String::from("run"),
            status: RefreshStatus::Skipped,
            count: 0,
            updated_at: None,
        };
        let value = serde_json::to_value(&report).expect("serializes");
        assert_eq!(value["runId"], "run");
        assert_eq!(value["status"], "skipped");
        assert!(value.get("updatedAt").is_none());
    }
}
