use shelfcache_core::BatchCache;
use shelfcache_web::ServerConfig;

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn run(args: &ServeArgs, cache: BatchCache) -> Result<(), CliError> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    shelfcache_web::serve(config, cache).await?;
    Ok(())
}
