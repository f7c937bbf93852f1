use std::sync::Arc;

use shelfcache_core::{BatchCache, RateLimitStore, SlidingWindowLimiter};

use crate::config::{ServerConfig, SiteSettings};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub cache: BatchCache,
    pub site: Arc<SiteSettings>,
    pub limiter: Option<Arc<dyn RateLimitStore>>,
}

impl AppState {
    pub fn new(cache: BatchCache, site: SiteSettings) -> Self {
        Self {
            cache,
            site: Arc::new(site),
            limiter: None,
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimitStore>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn from_config(config: &ServerConfig, cache: BatchCache) -> Self {
        let state = Self::new(cache, config.site.clone());
        if config.rate_limit == 0 {
            return state;
        }
        state.with_limiter(Arc::new(SlidingWindowLimiter::new(
            config.rate_limit,
            config.rate_window,
        )))
    }
}
