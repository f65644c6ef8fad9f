//! Envelope-encrypted store.
//!
//! Wraps a [`KvStore`] so every logical record is AES-GCM encrypted with a
//! caller-supplied key before it reaches the backend, and decrypted on the
//! way out. The payload side is a typed serde boundary; the stored side is
//! always the fixed `IV || ciphertext+tag` byte format.
//!
//! On reads, a record that is missing, undecryptable, or unparseable is
//! reported as absent — "no data yet" and "wrong key" are indistinguishable
//! to callers on the hot path, which keeps first-access flows simple.

use crate::error::KvResult;
use crate::store::{Consistency, KvStore, SetOptions};
use habitkeep_crypto::{decrypt_from_bytes, encrypt_to_bytes, SymmetricKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Encrypt/decrypt wrapper around a key-value backend.
#[derive(Clone)]
pub struct EnvelopeStore {
    store: Arc<dyn KvStore>,
}

impl EnvelopeStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The underlying backend, for ciphertext-level access (rotation).
    pub fn backend(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Reads and decrypts a typed record.
    ///
    /// Returns `Ok(None)` when the record is missing *or* cannot be
    /// decrypted/parsed — never an error on the hot read path.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key_path: &str,
        key: &SymmetricKey,
    ) -> KvResult<Option<T>> {
        self.get_with::<T>(key_path, key, Consistency::Strong).await
    }

    /// Like [`get`](Self::get) with an explicit consistency mode.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        key_path: &str,
        key: &SymmetricKey,
        consistency: Consistency,
    ) -> KvResult<Option<T>> {
        let Some(bytes) = self.store.get_with(key_path, consistency).await? else {
            return Ok(None);
        };
        let plaintext = match decrypt_from_bytes(key, &bytes) {
            Ok(p) => p,
            Err(e) => {
                debug!(path = %key_path, "treating undecryptable record as absent: {e}");
                return Ok(None);
            }
        };
        match serde_json::from_slice(&plaintext) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!(path = %key_path, "treating unparseable record as absent: {e}");
                Ok(None)
            }
        }
    }

    /// Encrypts and writes a typed record with a fresh IV.
    pub async fn set<T: Serialize>(
        &self,
        key_path: &str,
        key: &SymmetricKey,
        value: &T,
        opts: SetOptions,
    ) -> KvResult<()> {
        let plaintext = serde_json::to_vec(value)?;
        let bytes = encrypt_to_bytes(key, &plaintext)?;
        self.store.set(key_path, bytes, opts).await
    }

    /// Reads the raw ciphertext of a record.
    pub async fn get_raw(&self, key_path: &str) -> KvResult<Option<Vec<u8>>> {
        self.store.get(key_path).await
    }

    /// Writes pre-encrypted bytes as-is.
    pub async fn set_raw(&self, key_path: &str, bytes: Vec<u8>, opts: SetOptions) -> KvResult<()> {
        self.store.set(key_path, bytes, opts).await
    }

    pub async fn delete(&self, key_path: &str) -> KvResult<()> {
        self.store.delete(key_path).await
    }

    /// Lists the key paths (not values) under a prefix.
    pub async fn list_keys(&self, prefix: &str) -> KvResult<Vec<String>> {
        Ok(self
            .store
            .list_by_prefix(prefix)
            .await?
            .into_iter()
            .map(|(k, _)| k)
            .collect())
    }

    /// Lists key paths and raw ciphertext under a prefix.
    pub async fn list_raw(&self, prefix: &str) -> KvResult<Vec<(String, Vec<u8>)>> {
        self.store.list_by_prefix(prefix).await
    }
}
