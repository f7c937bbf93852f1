//! Environment-provided configuration for the upstream adapter.
//!
//! Credentials are optional at load time and resolved per operation, so a
//! missing value fails the operation that needs it before any network call.

use std::fmt::{Debug, Formatter};

use crate::{Asin, ConfigError, ValidationError};

pub const ENV_ACCESS_KEY: &str = "AMAZON_PAAPI_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "AMAZON_PAAPI_SECRET_KEY";
pub const ENV_PARTNER_TAG: &str = "AMAZON_ASSOCIATE_TAG";
pub const ENV_HOST: &str = "AMAZON_PAAPI_HOST";
pub const ENV_REGION: &str = "AMAZON_PAAPI_REGION";
pub const ENV_MARKETPLACE: &str = "AMAZON_MARKETPLACE";

pub const DEFAULT_HOST: &str = "webservices.amazon.com";

/// PA-API host to signing region and marketplace.
const LOCALES: &[(&str, &str, &str)] = &[
    ("webservices.amazon.com", "us-east-1", "www.amazon.com"),
    ("webservices.amazon.ca", "us-east-1", "www.amazon.ca"),
    ("webservices.amazon.com.mx", "us-east-1", "www.amazon.com.mx"),
    ("webservices.amazon.com.br", "us-east-1", "www.amazon.com.br"),
    ("webservices.amazon.co.uk", "eu-west-1", "www.amazon.co.uk"),
    ("webservices.amazon.de", "eu-west-1", "www.amazon.de"),
    ("webservices.amazon.fr", "eu-west-1", "www.amazon.fr"),
    ("webservices.amazon.it", "eu-west-1", "www.amazon.it"),
    ("webservices.amazon.es", "eu-west-1", "www.amazon.es"),
    ("webservices.amazon.nl", "eu-west-1", "www.amazon.nl"),
    ("webservices.amazon.se", "eu-west-1", "www.amazon.se"),
    ("webservices.amazon.pl", "eu-west-1", "www.amazon.pl"),
    ("webservices.amazon.in", "eu-west-1", "www.amazon.in"),
    ("webservices.amazon.ae", "eu-west-1", "www.amazon.ae"),
    ("webservices.amazon.sa", "eu-west-1", "www.amazon.sa"),
    ("webservices.amazon.com.tr", "eu-west-1", "www.amazon.com.tr"),
    ("webservices.amazon.eg", "eu-west-1", "www.amazon.eg"),
    ("webservices.amazon.co.jp", "us-west-2", "www.amazon.co.jp"),
    ("webservices.amazon.com.au", "us-west-2", "www.amazon.com.au"),
    ("webservices.amazon.sg", "us-west-2", "www.amazon.sg"),
];

/// Signing region and marketplace for a PA-API host.
///
/// Unknown hosts sign against `us-east-1` and use `www.` plus the host's
/// `amazon.*` suffix as the marketplace.
pub fn locale_for_host(host: &str) -> (String, String) {
    let host = host.trim().to_ascii_lowercase();
    if let Some((_, region, marketplace)) = LOCALES.iter().find(|(known, _, _)| *known == host) {
        return ((*region).to_owned(), (*marketplace).to_owned());
    }

    let suffix = host
        .find("amazon.")
        .map(|index| &host[index..])
        .unwrap_or("amazon.com");
    (String::from("us-east-1"), format!("www.{suffix}"))
}

/// Upstream credential triple. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub partner_tag: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("partner_tag", &self.partner_tag)
            .finish()
    }
}

/// Product Advertising API settings.
#[derive(Clone, PartialEq, Eq)]
pub struct PaApiConfig {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub partner_tag: Option<String>,
    pub host: String,
    pub region: String,
    pub marketplace: String,
}

impl PaApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let host = read(ENV_HOST).unwrap_or_else(|| String::from(DEFAULT_HOST));
        let (default_region, default_marketplace) = locale_for_host(&host);

        Self {
            access_key: read(ENV_ACCESS_KEY),
            secret_key: read(ENV_SECRET_KEY),
            partner_tag: read(ENV_PARTNER_TAG),
            region: read(ENV_REGION).unwrap_or(default_region),
            marketplace: read(ENV_MARKETPLACE).unwrap_or(default_marketplace),
            host,
        }
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        partner_tag: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self.partner_tag = Some(partner_tag.into());
        self
    }

    /// Resolve the credential triple, naming the first missing setting.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let access_key = self
            .access_key
            .clone()
            .ok_or(ConfigError::Missing(ENV_ACCESS_KEY))?;
        let secret_key = self
            .secret_key
            .clone()
            .ok_or(ConfigError::Missing(ENV_SECRET_KEY))?;
        let partner_tag = self
            .partner_tag
            .clone()
            .ok_or(ConfigError::Missing(ENV_PARTNER_TAG))?;

        Ok(Credentials {
            access_key,
            secret_key,
            partner_tag,
        })
    }
}

impl Default for PaApiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Debug for PaApiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaApiConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("partner_tag", &self.partner_tag)
            .field("host", &self.host)
            .field("region", &self.region)
            .field("marketplace", &self.marketplace)
            .finish()
    }
}

/// Parse a comma or whitespace separated ASIN list.
pub fn parse_asin_list(raw: &str) -> Result<Vec<Asin>, ValidationError> {
    Asin::parse_list(
        raw.split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|part| !part.is_empty()),
    )
}
