use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::ORIGIN;
use axum::http::{HeaderMap, Method};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shelfcache_core::domain::now_epoch_millis;
use shelfcache_core::NormalizedItem;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::guard::{header_str, site_key_matches};
use crate::state::AppState;

/// Optional read filter. A missing, null or empty list selects everything.
#[derive(Debug, Default, Deserialize)]
pub struct ReadRequest {
    #[serde(default)]
    pub asins: Option<Vec<String>>,
}

impl ReadRequest {
    pub fn requested(&self) -> &[String] {
        self.asins.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    pub updated_at: i64,
    pub ttl_seconds: u64,
    pub count: usize,
    pub items: Vec<NormalizedItem>,
}

/// Serve the cached batch, optionally narrowed to requested ASINs.
pub async fn read_prices(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReadResponse>, ApiError> {
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }
    if !site_key_matches(&state.site, &headers) {
        return Err(ApiError::Unauthorized);
    }
    if let Some(origin) = header_str(&headers, ORIGIN.as_str()) {
        if !state.site.is_allowed_origin(origin) {
            return Err(ApiError::Forbidden);
        }
    }

    let filter = parse_body(&body)?;

    let batch = state
        .cache
        .read()
        .await
        .map_err(|err| {
            error!(error = %err, "failed to read price cache");
            ApiError::Internal
        })?
        .ok_or(ApiError::CacheEmpty)?;

    // TTL is advisory; stale batches are still served.
    if batch.is_stale_at(now_epoch_millis()) {
        debug!(updated_at = batch.updated_at, "serving stale price batch");
    }

    let items = batch.select(filter.requested());
    Ok(Json(ReadResponse {
        updated_at: batch.updated_at,
        ttl_seconds: batch.ttl_seconds,
        count: items.len(),
        items,
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn parse_body(body: &[u8]) -> Result<ReadRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReadRequest::default());
    }
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidBody)
}
