use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{any, get};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::guard::{access_guard, cors_layer, preflight_no_content};
use crate::handlers::{health, read_prices};
use crate::limit::rate_limit;
use crate::state::AppState;

pub const READ_PATH: &str = "/api/prices";
pub const HEALTH_PATH: &str = "/healthz";

/// Application router. Outermost first, the read route runs through the
/// preflight status fix, CORS, the guard, then the limiter.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(READ_PATH, any(read_prices))
        .route_layer(from_fn_with_state(state.clone(), rate_limit))
        .route_layer(from_fn_with_state(state.clone(), access_guard))
        .route_layer(cors_layer(&state.site))
        .route_layer(from_fn(preflight_no_content))
        .route(HEALTH_PATH, get(health))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
