//! # Shelfcache Web
//!
//! Guarded HTTP surface over the cached price batch.
//!
//! | Route | Method | Notes |
//! |-------|--------|-------|
//! | [`READ_PATH`] | `POST` | Site key, same-site and rate checks; optional `{"asins": [...]}` filter |
//! | [`HEALTH_PATH`] | `GET` | Liveness only |
//!
//! Every response carries `Cache-Control: no-store`. Reads never touch the
//! upstream API; an empty cache answers 503 until the first refresh lands.

pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod limit;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use shelfcache_core::BatchCache;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::info;

pub use config::{ServerConfig, SiteSettings};
pub use error::ApiError;
pub use guard::SITE_KEY_HEADER;
pub use handlers::{ReadRequest, ReadResponse};
pub use routes::{router, HEALTH_PATH, READ_PATH};
pub use state::AppState;

/// Bind on all interfaces and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig, cache: BatchCache) -> std::io::Result<()> {
    let state = AppState::from_config(&config, cache);
    let app = router(state);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address).await?;
    info!(%address, rate_limit = config.rate_limit, "shelfcache listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
