use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shelfcache_core::RateDecision;
use tracing::debug;

use crate::error::ApiError;
use crate::guard::header_str;
use crate::state::AppState;

/// Per-client sliding-window limit keyed by route and caller address.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    let key = format!("{}:{}", request.uri().path(), client_id(&request));
    match limiter.check(&key, Instant::now()) {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            debug!(%key, "rate limit exceeded");
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}

/// First `x-forwarded-for` hop, else `x-real-ip`, else a shared bucket.
fn client_id(request: &Request) -> String {
    let headers = request.headers();
    header_str(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .unwrap_or("anonymous")
        .to_owned()
}
