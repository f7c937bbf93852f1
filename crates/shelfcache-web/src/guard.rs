//! Edge access guard for the read endpoint.
//!
//! Rules, first match wins:
//!
//! 1. `OPTIONS` gets an empty 204. The scoped CORS headers come from
//!    [`cors_layer`], which wraps the guard so rejections carry them too.
//! 2. Origin and Referer both present but neither on the site origin: 403.
//! 3. Anything but `POST`: 405.
//! 4. `x-site-key` missing or wrong: 401.
//! 5. Otherwise the request passes through unchanged.
//!
//! The same-site check only rejects when both headers are present, so
//! server-to-server callers work. It is not an authorization boundary; the
//! shared secret is, and the read endpoint checks a lone `Origin` itself.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, ORIGIN, REFERER};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::debug;

use crate::config::SiteSettings;
use crate::error::ApiError;
use crate::state::AppState;

pub const SITE_KEY_HEADER: &str = "x-site-key";

pub async fn access_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match check(&state.site, request.method(), request.headers()) {
        Ok(Some(preflight)) => preflight,
        Ok(None) => next.run(request).await,
        Err(error) => {
            debug!(reason = error.code(), "access guard rejected request");
            error.into_response()
        }
    }
}

/// CORS scoped to the allow-listed origins, `POST` and the site-key header.
pub fn cors_layer(site: &SiteSettings) -> CorsLayer {
    let origins = site
        .allowed_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok());

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(SITE_KEY_HEADER)])
        .max_age(Duration::from_secs(600))
}

/// Preflights answered by [`cors_layer`] go out as 204 instead of 200.
pub async fn preflight_no_content(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if preflight && response.status().is_success() {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// `Ok(Some(_))` short-circuits with a preflight response, `Ok(None)` passes.
fn check(
    site: &SiteSettings,
    method: &Method,
    headers: &HeaderMap,
) -> Result<Option<Response>, ApiError> {
    if method == Method::OPTIONS {
        return Ok(Some(StatusCode::NO_CONTENT.into_response()));
    }

    if !is_same_site(site, headers) {
        return Err(ApiError::Forbidden);
    }

    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    if !site_key_matches(site, headers) {
        return Err(ApiError::Unauthorized);
    }

    Ok(None)
}

fn is_same_site(site: &SiteSettings, headers: &HeaderMap) -> bool {
    let origin = header_str(headers, ORIGIN.as_str());
    let referer = header_str(headers, REFERER.as_str());

    match (origin, referer) {
        (Some(origin), Some(referer)) => site.is_same_site(origin) || site.is_same_site(referer),
        _ => true,
    }
}

/// Whether the request carries the configured shared secret.
pub(crate) fn site_key_matches(site: &SiteSettings, headers: &HeaderMap) -> bool {
    headers
        .get(SITE_KEY_HEADER)
        .map(|value| constant_time_eq(value.as_bytes(), site.site_key().as_bytes()))
        .unwrap_or(false)
}

/// Non-empty header value as text.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
