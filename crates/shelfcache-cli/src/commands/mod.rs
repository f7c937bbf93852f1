mod cache;
mod refresh;
mod serve;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use shelfcache_core::{BatchCache, FsBlobStore, PaApiConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Dispatch a parsed command. `Some` carries the JSON document to print.
pub async fn run(cli: &Cli) -> Result<Option<Value>, CliError> {
    let cache = file_cache(&cli.data_dir);

    match &cli.command {
        Command::Refresh(args) => refresh::run(args, PaApiConfig::from_env(), cache)
            .await
            .map(Some),
        Command::Serve(args) => {
            serve::run(args, cache).await?;
            Ok(None)
        }
        Command::Cache(args) => cache::run(args.command, &cache).await.map(Some),
    }
}

fn file_cache(data_dir: &Path) -> BatchCache {
    BatchCache::new(Arc::new(FsBlobStore::new(data_dir)))
}
