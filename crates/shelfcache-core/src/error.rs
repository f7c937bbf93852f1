use thiserror::Error;

/// Validation errors for identifiers and request shapes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asin cannot be empty")]
    EmptyAsin,
    #[error("asin must be exactly {expected} characters, got {len}")]
    AsinLength { len: usize, expected: usize },
    #[error("asin contains invalid character '{ch}' at index {index}")]
    AsinInvalidChar { ch: char, index: usize },

    #[error("GetItems requires at least one item id")]
    EmptyItemIds,
    #[error("GetItems accepts at most {max} item ids, got {len}")]
    TooManyItemIds { len: usize, max: usize },
}

/// Missing or unusable environment configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required setting {0} is not set")]
    Missing(&'static str),
    #[error("setting {name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failure reported by, or while talking to, the Product Advertising API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream transport error: {0}")]
    Transport(String),
    #[error("upstream returned status {status}")]
    Status { status: u16, code: Option<String> },
    #[error("upstream reported {count} error(s), first {code}: {message}")]
    Reported {
        count: usize,
        code: String,
        message: String,
    },
    #[error("upstream response could not be decoded: {0}")]
    Malformed(String),
}

impl UpstreamError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "upstream.transport",
            Self::Status { .. } => "upstream.status",
            Self::Reported { .. } => "upstream.reported",
            Self::Malformed(_) => "upstream.malformed",
        }
    }
}

/// Blob store and cache serialization failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid blob key '{0}'")]
    InvalidKey(String),

    #[error("blob store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cached batch serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Anything that can stop a catalog sync before the cache write.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "sync.configuration",
            Self::Validation(_) => "sync.validation",
            Self::Upstream(error) => error.code(),
            Self::Store(_) => "sync.store",
        }
    }
}
