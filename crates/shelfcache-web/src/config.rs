use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use shelfcache_core::ConfigError;

pub const ENV_SITE_KEY: &str = "SITE_KEY";
pub const ENV_ALLOWED_ORIGIN: &str = "ALLOWED_ORIGIN";
pub const ENV_PORT: &str = "SHELFCACHE_PORT";
pub const ENV_RATE_LIMIT: &str = "SHELFCACHE_RATE_LIMIT";
pub const ENV_RATE_WINDOW_SECS: &str = "SHELFCACHE_RATE_WINDOW_SECS";

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_RATE_LIMIT: u32 = 60;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;

/// Caller-facing access settings shared by the guard and the read endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteSettings {
    site_key: String,
    allowed_origins: Vec<String>,
}

impl SiteSettings {
    /// `allowed_origins` must be non-empty and usable as header values.
    pub fn new(
        site_key: impl Into<String>,
        allowed_origins: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let site_key = site_key.into();
        if site_key.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_SITE_KEY));
        }

        let allowed_origins: Vec<String> = allowed_origins
            .into_iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_owned())
            .filter(|origin| !origin.is_empty())
            .collect();
        if allowed_origins.is_empty() {
            return Err(ConfigError::Missing(ENV_ALLOWED_ORIGIN));
        }
        if let Some(bad) = allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(ConfigError::Invalid {
                name: ENV_ALLOWED_ORIGIN,
                reason: format!("'{bad}' is not a valid header value"),
            });
        }

        Ok(Self {
            site_key,
            allowed_origins,
        })
    }

    pub fn site_key(&self) -> &str {
        &self.site_key
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    /// Exact match against the allow-list.
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        let origin = origin.trim().trim_end_matches('/');
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Prefix match used by the same-site check (covers Referer URLs).
    pub fn is_same_site(&self, value: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| value.starts_with(allowed.as_str()))
    }
}

impl Debug for SiteSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteSettings")
            .field("site_key", &"<redacted>")
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub site: SiteSettings,
    /// Requests per window per client; zero disables limiting.
    pub rate_limit: u32,
    pub rate_window: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let site_key = read(ENV_SITE_KEY).ok_or(ConfigError::Missing(ENV_SITE_KEY))?;
        let origins = read(ENV_ALLOWED_ORIGIN)
            .unwrap_or_else(|| String::from(DEFAULT_ALLOWED_ORIGIN))
            .split(',')
            .map(str::to_owned)
            .collect();

        Ok(Self {
            port: parse_or(read(ENV_PORT), ENV_PORT, DEFAULT_PORT)?,
            site: SiteSettings::new(site_key, origins)?,
            rate_limit: parse_or(read(ENV_RATE_LIMIT), ENV_RATE_LIMIT, DEFAULT_RATE_LIMIT)?,
            rate_window: Duration::from_secs(parse_or(
                read(ENV_RATE_WINDOW_SECS),
                ENV_RATE_WINDOW_SECS,
                DEFAULT_RATE_WINDOW_SECS,
            )?),
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|error: T::Err| ConfigError::Invalid {
            name,
            reason: error.to_string(),
        }),
        None => Ok(default),
    }
}
