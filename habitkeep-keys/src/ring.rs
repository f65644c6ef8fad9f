//! The DEK ring: a small set of named Data Encryption Keys.
//!
//! The whole ring is persisted as one envelope record at `crypto/env`,
//! encrypted under the KEK, and cached in process memory. Readers always
//! see the latest committed ring; only the rotation engine mutates it,
//! through [`KeyRing::install`], which persists (read-back-verified)
//! before swapping the cache.

use crate::error::{KeyError, KeyResult};
use crate::kek::Kek;
use crate::layout::DEK_RING_PATH;
use habitkeep_crypto::{decrypt_from_bytes, generate_random_key, SymmetricKey};
use habitkeep_kv::{EnvelopeStore, SetOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Names of the rotatable keys in the ring.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DekName {
    /// Encrypts per-user uuDEK records.
    UserDek,
    /// Encrypts session records.
    SessionDek,
    /// Encrypts settings records.
    SettingsDek,
    /// HMAC key for session and public-user tokens.
    SigningKey,
}

impl DekName {
    pub const ALL: [DekName; 4] = [
        DekName::UserDek,
        DekName::SessionDek,
        DekName::SettingsDek,
        DekName::SigningKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DekName::UserDek => "user_dek",
            DekName::SessionDek => "session_dek",
            DekName::SettingsDek => "settings_dek",
            DekName::SigningKey => "signing_key",
        }
    }
}

impl std::fmt::Display for DekName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted ring record.
#[derive(Clone, Serialize, Deserialize)]
struct DekRing {
    deks: BTreeMap<DekName, SymmetricKey>,
}

impl DekRing {
    fn new_random() -> Self {
        let mut deks = BTreeMap::new();
        for name in DekName::ALL {
            deks.insert(name, generate_random_key());
        }
        Self { deks }
    }

    fn key(&self, name: DekName) -> KeyResult<SymmetricKey> {
        self.deks
            .get(&name)
            .cloned()
            .ok_or_else(|| KeyError::Config(format!("DEK ring is missing {name}")))
    }

    fn same_keys(&self, other: &DekRing) -> bool {
        DekName::ALL.iter().all(|name| {
            match (self.deks.get(name), other.deks.get(name)) {
                (Some(a), Some(b)) => a.as_bytes() == b.as_bytes(),
                _ => false,
            }
        })
    }
}

/// In-process holder of the current DEKs.
///
/// Explicitly owned and injected — there is no global key state. Clone the
/// surrounding `Arc` to share it; the cache inside is already shared.
pub struct KeyRing {
    store: EnvelopeStore,
    kek: Kek,
    cache: Arc<RwLock<DekRing>>,
}

impl KeyRing {
    /// Loads the ring from storage, or initializes a fresh one on first boot.
    ///
    /// A ring record that exists but does not decrypt under the supplied KEK
    /// is a fatal configuration error — silently regenerating would orphan
    /// every record encrypted under the real DEKs.
    pub async fn load_or_init(store: EnvelopeStore, kek: Kek) -> KeyResult<Arc<Self>> {
        let ring = match store.get_raw(DEK_RING_PATH).await? {
            Some(bytes) => {
                let plaintext = decrypt_from_bytes(kek.key(), &bytes).map_err(|_| {
                    KeyError::Config(
                        "DEK ring exists but does not decrypt under the supplied KEK".to_string(),
                    )
                })?;
                serde_json::from_slice::<DekRing>(&plaintext)?
            }
            None => {
                let ring = DekRing::new_random();
                persist_verified(&store, &kek, &ring).await?;
                info!("initialized fresh DEK ring");
                ring
            }
        };

        Ok(Arc::new(Self {
            store,
            kek,
            cache: Arc::new(RwLock::new(ring)),
        }))
    }

    /// Returns the current key for `name` from the cache.
    pub async fn key(&self, name: DekName) -> KeyResult<SymmetricKey> {
        self.cache.read().await.key(name)
    }

    /// Convenience accessor for the signing key.
    pub async fn signing_key(&self) -> KeyResult<SymmetricKey> {
        self.key(DekName::SigningKey).await
    }

    /// Commits a new key for `name`: persists the updated ring under the
    /// KEK (read-back-verified), then swaps the cache so readers pick up
    /// the new key immediately.
    pub(crate) async fn install(&self, name: DekName, new_key: SymmetricKey) -> KeyResult<()> {
        let mut updated = self.cache.read().await.clone();
        updated.deks.insert(name, new_key);

        persist_verified(&self.store, &self.kek, &updated).await?;

        let mut cache = self.cache.write().await;
        *cache = updated;
        info!(dek = %name, "committed rotated key to the ring");
        Ok(())
    }

    /// Re-encrypts the persisted ring under a new KEK. User data is
    /// untouched — it is encrypted under DEKs, which do not change here.
    pub(crate) async fn reencrypt_under(&self, new_kek: &Kek) -> KeyResult<()> {
        let ring = self.cache.read().await.clone();
        persist_verified(&self.store, new_kek, &ring).await?;
        info!("re-encrypted DEK ring under new KEK");
        Ok(())
    }
}

/// Persists the ring and trusts nothing until it reads back intact.
async fn persist_verified(store: &EnvelopeStore, kek: &Kek, ring: &DekRing) -> KeyResult<()> {
    store
        .set(DEK_RING_PATH, kek.key(), ring, SetOptions::default())
        .await?;

    let read_back: Option<DekRing> = store.get(DEK_RING_PATH, kek.key()).await?;
    match read_back {
        Some(persisted) if persisted.same_keys(ring) => Ok(()),
        _ => Err(KeyError::WriteNotVerified(DEK_RING_PATH.to_string())),
    }
}
