use serde_json::{json, Value};
use shelfcache_core::BatchCache;

use crate::cli::CacheCommand;
use crate::error::CliError;

pub async fn run(command: CacheCommand, cache: &BatchCache) -> Result<Value, CliError> {
    match command {
        CacheCommand::Show => match cache.read().await? {
            Some(batch) => Ok(serde_json::to_value(batch)?),
            None => Ok(json!({ "status": "empty" })),
        },
        CacheCommand::Clear => {
            cache.clear().await?;
            Ok(json!({ "status": "cleared" }))
        }
    }
}
