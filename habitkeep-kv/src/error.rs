//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur in the key-value layer.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] habitkeep_crypto::CryptoError),
}

impl From<duckdb::Error> for KvError {
    fn from(e: duckdb::Error) -> Self {
        KvError::Backend(e.to_string())
    }
}
