//! CLI argument definitions for shelfcache.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `refresh` | Fetch configured ASINs from PA-API and replace the cached batch |
//! | `serve` | Run the guarded read endpoint |
//! | `cache show` | Print the stored batch |
//! | `cache clear` | Remove the stored batch |
//!
//! # Examples
//!
//! ```bash
//! # Hourly scheduler entry
//! shelfcache refresh
//!
//! # One-off refresh of two items, pretty-printed
//! shelfcache refresh --asin B000000001,B000000002 --pretty
//!
//! # Serve on a custom port
//! SITE_KEY=... shelfcache serve --port 9000
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Amazon affiliate price cache: scheduled refresh and guarded read endpoint.
#[derive(Debug, Parser)]
#[command(name = "shelfcache", author, version, about)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Directory of the file-backed cache.
    #[arg(
        long,
        global = true,
        env = "SHELFCACHE_DATA_DIR",
        default_value = "./.shelfcache"
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh the price cache from the Product Advertising API.
    ///
    /// An empty ASIN list is a successful no-op. On failure the previous
    /// batch stays in place and the exit code is non-zero.
    Refresh(RefreshArgs),

    /// Serve the cached batch over HTTP.
    Serve(ServeArgs),

    /// Inspect or clear the cached batch.
    Cache(CacheArgs),
}

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// ASINs to refresh; repeat or separate with commas.
    #[arg(long = "asin", env = "SHELFCACHE_ASINS", value_delimiter = ',')]
    pub asins: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen port; overrides SHELFCACHE_PORT.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheCommand {
    /// Print the stored batch, or report that none exists.
    Show,
    /// Remove the stored batch.
    Clear,
}
