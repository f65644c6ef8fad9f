//! Data layer error types.

use thiserror::Error;

/// Result type for data layer operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors that can occur in the data layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// An operation that needs a stored profile ran for a user without one.
    #[error("no profile stored for this user")]
    ProfileRequired,

    #[error("storage error: {0}")]
    Kv(#[from] habitkeep_kv::KvError),

    #[error("key hierarchy error: {0}")]
    Keys(#[from] habitkeep_keys::KeyError),

    #[error("crypto error: {0}")]
    Crypto(#[from] habitkeep_crypto::CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
