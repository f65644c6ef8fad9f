//! The caller-facing data service.
//!
//! Route handlers talk to this and nothing below it. Every operation
//! derives the caller's storage scope, fetches the right tier of key, and
//! goes through the envelope store — plaintext never touches a backend.

use crate::config::DataConfig;
use crate::error::DataResult;
use crate::types::{ContentConfig, DayEntry, ExportBundle, Settings, UserProfile};
use chrono::Utc;
use habitkeep_keys::{layout, DekName, Kek, KeyDeriver, KeyRing, RotationEngine, UserScope};
use habitkeep_kv::{EnvelopeStore, KvStore, SetOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Encrypted data access facade.
pub struct DataService {
    pub(crate) store: EnvelopeStore,
    pub(crate) ring: Arc<KeyRing>,
    pub(crate) deriver: KeyDeriver,
    pub(crate) config: DataConfig,
    rotation: RotationEngine,
}

impl DataService {
    /// Boots the service: loads (or initializes) the DEK ring under the
    /// supplied KEK and wires up derivation and rotation.
    pub async fn open(
        backend: Arc<dyn KvStore>,
        kek: Kek,
        config: DataConfig,
    ) -> DataResult<Self> {
        let store = EnvelopeStore::new(backend);
        let ring = KeyRing::load_or_init(store.clone(), kek).await?;
        let deriver = KeyDeriver::new(store.clone(), ring.clone(), &config.kdf)?;
        let rotation = RotationEngine::new(store.clone(), ring.clone());
        Ok(Self {
            store,
            ring,
            deriver,
            config,
            rotation,
        })
    }

    /// The rotation engine, for operator endpoints.
    pub fn rotation(&self) -> &RotationEngine {
        &self.rotation
    }

    /// Signs an opaque identifier under the current signing key.
    pub async fn sign_data(&self, data: &str) -> DataResult<String> {
        let key = self.ring.signing_key().await?;
        Ok(habitkeep_crypto::signing::sign(&key, data)?)
    }

    /// Verifies a signature under the current signing key. Fails closed.
    pub async fn verify_data(&self, data: &str, signature: &str) -> DataResult<bool> {
        let key = self.ring.signing_key().await?;
        Ok(habitkeep_crypto::signing::verify(&key, data, signature))
    }

    /// Write options for a scope: guest data always carries the TTL.
    pub(crate) fn write_opts(&self, scope: &UserScope) -> SetOptions {
        if scope.is_public() {
            SetOptions::expires_in(self.config.guest_ttl)
        } else {
            SetOptions::default()
        }
    }

    // ── Settings (settings DEK) ──────────────────────────────────────

    pub async fn get_settings(&self, scope: &UserScope) -> DataResult<Option<Settings>> {
        let user_key = self.deriver.user_key(scope)?;
        let dek = self.ring.key(DekName::SettingsDek).await?;
        Ok(self.store.get(&layout::settings_path(&user_key), &dek).await?)
    }

    pub async fn save_settings(&self, scope: &UserScope, settings: &Settings) -> DataResult<()> {
        let user_key = self.deriver.user_key(scope)?;
        let dek = self.ring.key(DekName::SettingsDek).await?;
        self.store
            .set(
                &layout::settings_path(&user_key),
                &dek,
                settings,
                self.write_opts(scope),
            )
            .await?;
        Ok(())
    }

    // ── Content and entries (uuDEK) ──────────────────────────────────

    pub async fn get_content(&self, scope: &UserScope) -> DataResult<Option<ContentConfig>> {
        let user_key = self.deriver.user_key(scope)?;
        let uudek = self.deriver.get_or_create_uudek_for_key(&user_key).await?;
        Ok(self.store.get(&layout::content_path(&user_key), &uudek).await?)
    }

    pub async fn save_content(&self, scope: &UserScope, content: &ContentConfig) -> DataResult<()> {
        let user_key = self.deriver.user_key(scope)?;
        let uudek = self.deriver.get_or_create_uudek_for_key(&user_key).await?;
        self.store
            .set(
                &layout::content_path(&user_key),
                &uudek,
                content,
                self.write_opts(scope),
            )
            .await?;
        Ok(())
    }

    /// Upserts one record per entry date.
    pub async fn save_entries(&self, scope: &UserScope, entries: &[DayEntry]) -> DataResult<()> {
        let user_key = self.deriver.user_key(scope)?;
        let uudek = self.deriver.get_or_create_uudek_for_key(&user_key).await?;
        for entry in entries {
            self.store
                .set(
                    &layout::entry_path(&user_key, &entry.date),
                    &uudek,
                    entry,
                    self.write_opts(scope),
                )
                .await?;
        }
        Ok(())
    }

    /// All entries in date order. Records that no longer decrypt are
    /// skipped — the read path tolerates partial rotations.
    pub async fn get_entries(&self, scope: &UserScope) -> DataResult<Vec<DayEntry>> {
        let user_key = self.deriver.user_key(scope)?;
        let uudek = self.deriver.get_or_create_uudek_for_key(&user_key).await?;

        let mut entries = Vec::new();
        for path in self.store.list_keys(&layout::entries_prefix(&user_key)).await? {
            if let Some(entry) = self.store.get::<DayEntry>(&path, &uudek).await? {
                entries.push(entry);
            } else {
                debug!(path = %path, "skipping unreadable entry record");
            }
        }
        Ok(entries)
    }

    // ── Profile (uuDEK) ──────────────────────────────────────────────

    pub async fn get_user(&self, scope: &UserScope) -> DataResult<Option<UserProfile>> {
        let user_key = self.deriver.user_key(scope)?;
        let uudek = self.deriver.get_or_create_uudek_for_key(&user_key).await?;
        Ok(self.store.get(&layout::profile_path(&user_key), &uudek).await?)
    }

    pub async fn save_user(&self, scope: &UserScope, profile: &UserProfile) -> DataResult<()> {
        let user_key = self.deriver.user_key(scope)?;
        let uudek = self.deriver.get_or_create_uudek_for_key(&user_key).await?;
        self.store
            .set(
                &layout::profile_path(&user_key),
                &uudek,
                profile,
                self.write_opts(scope),
            )
            .await?;
        Ok(())
    }

    // ── Export and wipe ──────────────────────────────────────────────

    /// Assembles everything the user owns into one bundle.
    pub async fn export_account(&self, scope: &UserScope) -> DataResult<ExportBundle> {
        Ok(ExportBundle {
            profile: self.get_user(scope).await?,
            settings: self.get_settings(scope).await?,
            content: self.get_content(scope).await?,
            entries: self.get_entries(scope).await?,
            exported_at: Utc::now(),
        })
    }

    /// Irrevocably deletes every record in the user's scope, including the
    /// uuDEK. Returns the number of records removed.
    pub async fn wipe_user(&self, scope: &UserScope) -> DataResult<usize> {
        let user_key = self.deriver.user_key(scope)?;

        let mut removed = 0;
        for path in self.store.list_keys(&layout::user_prefix(&user_key)).await? {
            self.store.delete(&path).await?;
            removed += 1;
        }

        let uudek_path = layout::uudek_path(&user_key);
        if self.store.get_raw(&uudek_path).await?.is_some() {
            self.store.delete(&uudek_path).await?;
            removed += 1;
        }

        info!(records = removed, "wiped user scope");
        Ok(removed)
    }
}
