use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Asin;

/// Advisory freshness window attached to every batch written by the refresh job.
pub const BATCH_TTL_SECONDS: u64 = 3_600;

/// Fixed-shape display record for one catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub asin: Asin,
    pub title: String,
    pub image_url: String,
    pub affiliate_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// True when the upstream returned at least one listing. Not a real stock signal.
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    pub show_price: bool,
    pub show_rating: bool,
}

/// The full normalized set produced by one refresh run, stored and served as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedBatch {
    /// Epoch milliseconds of the successful write.
    pub updated_at: i64,
    pub ttl_seconds: u64,
    pub items: Vec<NormalizedItem>,
}

impl CachedBatch {
    pub fn new(items: Vec<NormalizedItem>, updated_at: i64) -> Self {
        Self {
            updated_at,
            ttl_seconds: BATCH_TTL_SECONDS,
            items,
        }
    }

    /// Whether the advisory TTL has elapsed at `now_ms`.
    pub fn is_stale_at(&self, now_ms: i64) -> bool {
        let ttl_ms = i64::try_from(self.ttl_seconds.saturating_mul(1_000)).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.updated_at) > ttl_ms
    }

    /// Items whose ASIN appears in `requested`, in batch order.
    ///
    /// An empty request selects every item. Requested values are compared
    /// after trimming and uppercasing.
    pub fn select(&self, requested: &[String]) -> Vec<NormalizedItem> {
        if requested.is_empty() {
            return self.items.clone();
        }

        let wanted: HashSet<String> = requested
            .iter()
            .map(|value| value.trim().to_ascii_uppercase())
            .collect();

        self.items
            .iter()
            .filter(|item| wanted.contains(item.asin.as_str()))
            .cloned()
            .collect()
    }
}
