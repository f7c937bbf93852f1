use std::sync::Arc;

use serde_json::Value;
use shelfcache_core::{parse_asin_list, BatchCache, PaApiClient, PaApiConfig, RefreshJob};
use tracing::info;

use crate::cli::RefreshArgs;
use crate::error::CliError;

pub async fn run(
    args: &RefreshArgs,
    config: PaApiConfig,
    cache: BatchCache,
) -> Result<Value, CliError> {
    let asins = parse_asin_list(&args.asins.join(","))?;
    info!(host = %config.host, marketplace = %config.marketplace, "refresh configured");

    let job = RefreshJob::new(Arc::new(PaApiClient::new(config)), cache, asins);
    let report = job.run().await?;
    Ok(serde_json::to_value(report)?)
}

#[cfg(test)]
mod tests {
    use shelfcache_core::MemoryBlobStore;

    use super::*;

    fn cache() -> BatchCache {
        BatchCache::new(Arc::new(MemoryBlobStore::new()))
    }

    #[tokio::test]
    async fn empty_list_reports_skipped_without_credentials() {
        let args = RefreshArgs { asins: Vec::new() };

        let report = run(&args, PaApiConfig::default(), cache())
            .await
            .expect("no-op succeeds");

        assert_eq!(report["status"], "skipped");
        assert_eq!(report["count"], 0);
    }

    #[tokio::test]
    async fn invalid_asin_is_a_validation_error() {
        let args = RefreshArgs {
            asins: vec![String::from("B000000001"), String::from("nope")],
        };

        let err = run(&args, PaApiConfig::default(), cache())
            .await
            .expect_err("invalid asin");

        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn missing_credentials_fail_with_configuration_exit_code() {
        let args = RefreshArgs {
            asins: vec![String::from("B000000001")],
        };

        let err = run(&args, PaApiConfig::default(), cache())
            .await
            .expect_err("no credentials");

        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("AMAZON_PAAPI_ACCESS_KEY"));
    }
}
