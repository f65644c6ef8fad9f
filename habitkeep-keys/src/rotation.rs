//! Key rotation engine.
//!
//! Each rotation walks `Idle → GeneratingNewKey → ReEncrypting → Committed`
//! for its target. Re-encryption processes one key-path at a time,
//! sequentially, so memory stays bounded and no concurrent writer races the
//! old/new key swap. A record that fails to decrypt under the old key is
//! skipped and reported, never silently dropped — and never aborts the
//! whole rotation.
//!
//! New key material is returned to the caller exactly once for display and
//! is never logged.

use crate::error::{KeyError, KeyResult};
use crate::kek::Kek;
use crate::layout::{
    self, PUBLIC_USER_KEY_PREFIX, SESSION_PREFIX, USER_PREFIX, UUDEK_PREFIX,
};
use crate::ring::{DekName, KeyRing};
use habitkeep_crypto::{decrypt_from_bytes, encrypt_to_bytes, generate_random_key, SymmetricKey};
use habitkeep_kv::{EnvelopeStore, SetOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of rotating a single DEK.
#[derive(Debug)]
pub struct RotationReport {
    pub target: DekName,
    /// Hex form of the new key, for one-time operator display.
    pub new_key_hex: String,
    /// Records decrypted with the old key and rewritten under the new one.
    pub reencrypted: usize,
    /// Records discarded as a side effect (sessions, public users).
    pub deleted: usize,
    /// Key-paths that failed to decrypt and were left untouched.
    /// Non-empty means a partial rotation the operator must look at.
    pub skipped: Vec<String>,
}

impl RotationReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Outcome of a KEK rotation.
#[derive(Debug)]
pub struct KekRotation {
    /// Hex form of the new KEK, shown exactly once. The operator must put
    /// it in the environment and restart; it is never persisted.
    pub new_kek_hex: String,
}

/// Rotates DEKs, the signing key, and the KEK.
pub struct RotationEngine {
    store: EnvelopeStore,
    ring: Arc<KeyRing>,
    sealed: AtomicBool,
}

impl RotationEngine {
    pub fn new(store: EnvelopeStore, ring: Arc<KeyRing>) -> Self {
        Self {
            store,
            ring,
            sealed: AtomicBool::new(false),
        }
    }

    /// True once a KEK rotation has happened; every further operation
    /// refuses until the process restarts with the new KEK.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> KeyResult<()> {
        if self.is_sealed() {
            return Err(KeyError::Sealed);
        }
        Ok(())
    }

    /// Rotates one DEK (or the signing key), re-encrypting or discarding
    /// every record in its scope, then committing the new key to the ring.
    pub async fn rotate_dek(&self, target: DekName) -> KeyResult<RotationReport> {
        self.ensure_open()?;

        debug!(%target, "rotation: generating new key");
        let old_key = self.ring.key(target).await?;
        let new_key = generate_random_key();

        debug!(%target, "rotation: re-encrypting scope");
        let mut reencrypted = 0;
        let mut deleted = 0;
        let mut skipped = Vec::new();

        match target {
            DekName::UserDek => {
                let records = self.store.list_raw(UUDEK_PREFIX).await?;
                (reencrypted, skipped) =
                    self.reencrypt_records(records, &old_key, &new_key).await?;
            }
            DekName::SettingsDek => {
                let records = self
                    .store
                    .list_raw(USER_PREFIX)
                    .await?
                    .into_iter()
                    .filter(|(path, _)| layout::is_settings_path(path))
                    .collect();
                (reencrypted, skipped) =
                    self.reencrypt_records(records, &old_key, &new_key).await?;
            }
            DekName::SessionDek => {
                // Sessions are discarded, not re-encrypted: forcing re-login
                // is cheaper and safer than a re-encryption window for
                // ephemeral data.
                deleted = self.delete_prefix(SESSION_PREFIX).await?;
            }
            DekName::SigningKey => {
                // Every outstanding token is unverifiable under the new key:
                // drop all sessions, and drop public users entirely since
                // their token is their only way back in.
                deleted = self.delete_prefix(SESSION_PREFIX).await?;
                deleted += self
                    .delete_prefix(&format!("{USER_PREFIX}{PUBLIC_USER_KEY_PREFIX}"))
                    .await?;
                deleted += self
                    .delete_prefix(&format!("{UUDEK_PREFIX}{PUBLIC_USER_KEY_PREFIX}"))
                    .await?;
            }
        }

        self.ring.install(target, new_key.clone()).await?;
        info!(
            %target,
            reencrypted,
            deleted,
            skipped = skipped.len(),
            "rotation committed"
        );

        Ok(RotationReport {
            target,
            new_key_hex: hex::encode(new_key.as_bytes()),
            reencrypted,
            deleted,
            skipped,
        })
    }

    /// Rotates several DEKs, one at a time. A failure aborts only that
    /// target; earlier commits stay committed — partial success is
    /// returned to the caller, never rolled back.
    pub async fn rotate_many(
        &self,
        targets: &[DekName],
    ) -> Vec<(DekName, KeyResult<RotationReport>)> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for &target in targets {
            let result = self.rotate_dek(target).await;
            if let Err(e) = &result {
                warn!(%target, "rotation failed: {e}");
            }
            outcomes.push((target, result));
        }
        outcomes
    }

    /// Rotates the KEK: re-encrypts only the DEK ring record (user data is
    /// encrypted under DEKs and unaffected), seals the engine, and returns
    /// the new KEK for one-time display. The operator installs it in the
    /// environment and restarts the process.
    pub async fn rotate_kek(&self) -> KeyResult<KekRotation> {
        self.ensure_open()?;

        debug!("rotation: generating new KEK");
        let (new_kek, new_kek_hex) = Kek::generate();

        debug!("rotation: re-encrypting DEK ring");
        self.ring.reencrypt_under(&new_kek).await?;

        self.sealed.store(true, Ordering::SeqCst);
        info!("KEK rotation committed; engine sealed until restart");

        Ok(KekRotation { new_kek_hex })
    }

    /// Sequential decrypt-old / encrypt-new / write-back over a scope.
    async fn reencrypt_records(
        &self,
        records: Vec<(String, Vec<u8>)>,
        old_key: &SymmetricKey,
        new_key: &SymmetricKey,
    ) -> KeyResult<(usize, Vec<String>)> {
        let mut reencrypted = 0;
        let mut skipped = Vec::new();

        for (path, bytes) in records {
            let plaintext = match decrypt_from_bytes(old_key, &bytes) {
                Ok(p) => p,
                Err(_) => {
                    warn!(path = %path, "skipping record that does not decrypt under the old key");
                    skipped.push(path);
                    continue;
                }
            };
            // TTL is not preserved across re-encryption; guest records
            // regain their expiry on the next user write.
            let fresh = encrypt_to_bytes(new_key, &plaintext)?;
            self.store.set_raw(&path, fresh, SetOptions::default()).await?;
            reencrypted += 1;
        }

        Ok((reencrypted, skipped))
    }

    async fn delete_prefix(&self, prefix: &str) -> KeyResult<usize> {
        let keys = self.store.list_keys(prefix).await?;
        let count = keys.len();
        for key in keys {
            self.store.delete(&key).await?;
        }
        Ok(count)
    }
}
