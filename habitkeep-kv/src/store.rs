//! The key-value collaborator interface.
//!
//! Everything the data layer persists goes through this trait:
//! `get`/`set`/`delete`/`list_by_prefix` over opaque byte values, with
//! optional per-record TTL. Values are always ciphertext by the time they
//! reach a backend — encryption is the envelope store's concern, not the
//! backend's.

use crate::error::KvResult;
use async_trait::async_trait;
use std::time::Duration;

/// Read consistency mode.
///
/// The in-process backends are always strongly consistent; the flag exists
/// so callers state their requirement and a replicated backend can honor it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Consistency {
    #[default]
    Strong,
    Eventual,
}

/// Options for a `set` call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SetOptions {
    /// Expire the record this long after the write. `None` = no expiry.
    pub ttl: Option<Duration>,
}

impl SetOptions {
    /// Options with a TTL.
    pub fn expires_in(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// Generic key-value store with TTL and prefix listing.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads a record with the given consistency mode.
    async fn get_with(&self, key: &str, consistency: Consistency) -> KvResult<Option<Vec<u8>>>;

    /// Writes a record, replacing any existing value.
    async fn set(&self, key: &str, value: Vec<u8>, opts: SetOptions) -> KvResult<()>;

    /// Deletes a record. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> KvResult<()>;

    /// Lists all live records whose key starts with `prefix`, ordered by key.
    async fn list_by_prefix(&self, prefix: &str) -> KvResult<Vec<(String, Vec<u8>)>>;

    /// Strongly consistent read.
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        self.get_with(key, Consistency::Strong).await
    }
}
