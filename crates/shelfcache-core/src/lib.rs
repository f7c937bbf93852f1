//! # Shelfcache Core
//!
//! Product-price cache for an Amazon affiliate storefront.
//!
//! ## Overview
//!
//! A scheduled refresh job pulls item data from the Product Advertising API
//! (PA-API 5.0), normalizes it into fixed-shape display records and replaces a
//! single cached batch. The web crate serves that batch to the storefront.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | GetItems adapter and the [`CatalogSource`] trait |
//! | [`cache`] | Single-batch cache over a blob store |
//! | [`config`] | Environment settings and credential resolution |
//! | [`domain`] | ASIN, normalized item and batch types |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Upstream schema and the item normalizer |
//! | [`rate_limit`] | Sliding-window limiter |
//! | [`refresh`] | The refresh job |
//! | [`signing`] | Request signing (SigV4) |
//! | [`storage`] | Key-value blob stores |
//!
//! ## Architecture
//!
//! ```text
//! scheduler (@hourly)
//!        │
//!        ▼
//! ┌──────────────┐    ┌───────────────┐    ┌─────────────┐
//! │ RefreshJob   │───▶│ PaApiClient   │───▶│ SigV4Signer │
//! └──────┬───────┘    └──────┬────────┘    └─────────────┘
//!        │                   │ GetItems
//!        │                   ▼
//!        │            normalize_item
//!        ▼
//! ┌──────────────┐    ┌───────────────┐
//! │ BatchCache   │───▶│ BlobStore     │
//! └──────────────┘    └───────────────┘
//! ```
//!
//! ## Security
//!
//! - Credentials come from the environment and are redacted from `Debug` output
//! - A missing credential fails before any network call

pub mod adapters;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod rate_limit;
pub mod refresh;
pub mod signing;
pub mod storage;

pub use adapters::{CatalogSource, GetItemsRequest, PaApiClient, MAX_ITEM_IDS};

pub use cache::{BatchCache, CACHE_KEY};

pub use config::{parse_asin_list, Credentials, PaApiConfig};

pub use domain::{Asin, CachedBatch, NormalizedItem, BATCH_TTL_SECONDS};

pub use error::{ConfigError, StoreError, SyncError, UpstreamError, ValidationError};

pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, RecordingHttpClient,
    ReqwestHttpClient,
};

pub use normalize::{decode_get_items, normalize_item, GetItemsResponse, UpstreamItem};

pub use rate_limit::{RateDecision, RateLimitStore, SlidingWindowLimiter};

pub use refresh::{RefreshJob, RefreshReport, RefreshStatus, REFRESH_SCHEDULE};

pub use signing::{RequestDescriptor, RequestSigner, SigV4Signer};

pub use storage::{BlobStore, FsBlobStore, MemoryBlobStore, NoopBlobStore};
