use shelfcache_core::{ConfigError, StoreError, SyncError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("refresh failed [{code}]: {message}")]
    Refresh { code: &'static str, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<SyncError> for CliError {
    fn from(error: SyncError) -> Self {
        match error {
            SyncError::Config(inner) => Self::Config(inner),
            SyncError::Validation(inner) => Self::Validation(inner),
            other => Self::Refresh {
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 3,
            Self::Refresh { .. } => 4,
            Self::Store(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use shelfcache_core::UpstreamError;

    use super::*;

    #[test]
    fn refresh_failures_keep_their_category() {
        let missing: CliError = SyncError::from(ConfigError::Missing("SITE_KEY")).into();
        assert_eq!(missing.exit_code(), 3);

        let upstream: CliError = SyncError::from(UpstreamError::Status {
            status: 503,
            code: None,
        })
        .into();
        assert_eq!(upstream.exit_code(), 4);
        assert!(upstream.to_string().contains("upstream.status"));

        let invalid: CliError = ValidationError::EmptyAsin.into();
        assert_eq!(invalid.exit_code(), 2);
    }
}
