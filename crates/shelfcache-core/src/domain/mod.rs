//! # Domain Models
//!
//! Canonical catalog types shared by the refresh job and the read endpoint.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Asin`] | Validated catalog identifier |
//! | [`NormalizedItem`] | Fixed-shape display record |
//! | [`CachedBatch`] | One refresh run's items plus timestamp and TTL |
//!
//! A batch is replaced wholesale on every refresh; items are never mutated in
//! place.

mod asin;
mod models;
mod timestamp;

pub use asin::Asin;
pub use models::{CachedBatch, NormalizedItem, BATCH_TTL_SECONDS};
pub use timestamp::{epoch_millis, now_epoch_millis};
