//! Key hierarchy error types.

use thiserror::Error;

/// Result type for key hierarchy operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors that can occur in the key hierarchy.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Fatal boot-time misconfiguration (missing KEK, undecryptable ring).
    /// The process must refuse to serve traffic.
    #[error("configuration error: {0}")]
    Config(String),

    /// A user's uuDEK could not be created after the bounded retry.
    #[error("uuDEK unavailable for {0} after retry")]
    UudekUnavailable(String),

    /// The rotation engine was sealed by a KEK rotation; restart required.
    #[error("rotation engine sealed after KEK rotation; restart with the new KEK")]
    Sealed,

    /// A key write could not be verified by reading it back.
    #[error("read-after-write verification failed for {0}")]
    WriteNotVerified(String),

    #[error("storage error: {0}")]
    Kv(#[from] habitkeep_kv::KvError),

    #[error("crypto error: {0}")]
    Crypto(#[from] habitkeep_crypto::CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
