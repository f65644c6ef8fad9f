//! User key derivation and lazy uuDEK creation.
//!
//! Authenticated users get a keyed-hash derived key so their storage scope
//! is unguessable; public (guest) users keep their raw id under a
//! `public_` prefix — a deliberately lower-entropy scheme, since guest
//! data is ephemeral and TTL-bound.

use crate::error::{KeyError, KeyResult};
use crate::layout;
use crate::ring::{DekName, KeyRing};
use habitkeep_crypto::{derive_key, generate_random_key, signing, KdfParams, SymmetricKey};
use habitkeep_kv::{EnvelopeStore, SetOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Identity of the caller a storage scope is derived for.
///
/// Serializable because session records carry the scope they were
/// issued for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserScope {
    /// OAuth-authenticated user.
    Authenticated { provider: String, id: String },
    /// Anonymous/guest user identified only by a generated id.
    Public { id: String },
}

impl UserScope {
    pub fn is_public(&self) -> bool {
        matches!(self, UserScope::Public { .. })
    }
}

/// Derives storage scopes and user-unique DEKs.
pub struct KeyDeriver {
    store: EnvelopeStore,
    ring: Arc<KeyRing>,
    scope_key: SymmetricKey,
}

impl KeyDeriver {
    /// `params` carries the operator-tunable salt/iterations for the
    /// keyed hash behind authenticated user keys.
    pub fn new(store: EnvelopeStore, ring: Arc<KeyRing>, params: &KdfParams) -> KeyResult<Self> {
        let scope_key = derive_key("habitkeep-user-scope", params)?;
        Ok(Self {
            store,
            ring,
            scope_key,
        })
    }

    /// Deterministic storage key for a user.
    ///
    /// Two public users with the same raw id share a derived key — accepted,
    /// not a defect — but a public key can never collide with an
    /// authenticated one: those are hex HMAC output and never start with
    /// `public_`.
    pub fn user_key(&self, scope: &UserScope) -> KeyResult<String> {
        match scope {
            UserScope::Authenticated { provider, id } => {
                Ok(signing::sign(&self.scope_key, &format!("{provider}_{id}"))?)
            }
            UserScope::Public { id } => Ok(format!("{}{id}", layout::PUBLIC_USER_KEY_PREFIX)),
        }
    }

    /// Returns the user's uuDEK, creating it on first access.
    pub async fn get_or_create_uudek(&self, scope: &UserScope) -> KeyResult<SymmetricKey> {
        let user_key = self.user_key(scope)?;
        self.get_or_create_uudek_for_key(&user_key).await
    }

    /// Generate-if-absent with a bounded retry: generate, persist under the
    /// user-record DEK, then re-read — the write is never trusted directly.
    /// Retries the whole sequence exactly once before failing.
    pub async fn get_or_create_uudek_for_key(&self, user_key: &str) -> KeyResult<SymmetricKey> {
        let path = layout::uudek_path(user_key);
        let user_dek = self.ring.key(DekName::UserDek).await?;

        for attempt in 0..2 {
            if let Some(key) = self.store.get::<SymmetricKey>(&path, &user_dek).await? {
                return Ok(key);
            }

            let fresh = generate_random_key();
            self.store
                .set(&path, &user_dek, &fresh, SetOptions::default())
                .await?;

            if let Some(key) = self.store.get::<SymmetricKey>(&path, &user_dek).await? {
                return Ok(key);
            }
            debug!(attempt, path = %path, "uuDEK write did not read back");
        }

        Err(KeyError::UudekUnavailable(user_key.to_string()))
    }
}
