//! Session issue and validation on top of the signed-token utility.
//!
//! A session token is `<session_id>.<hex signature>`; the signature is
//! HMAC-SHA256 under the current signing key. Rotating the signing key (or
//! the session DEK) is the only invalidation mechanism besides the TTL.

use crate::error::DataResult;
use crate::service::DataService;
use crate::types::{SessionRecord, SessionToken};
use chrono::Utc;
use habitkeep_crypto::signing;
use habitkeep_keys::{layout, DekName, UserScope};
use habitkeep_kv::SetOptions;
use tracing::debug;
use uuid::Uuid;

impl DataService {
    /// Issues a session for a signed-in (or guest) user.
    pub async fn create_session(&self, scope: &UserScope) -> DataResult<SessionToken> {
        let session_id = Uuid::new_v4().to_string();
        let signing_key = self.ring.signing_key().await?;
        let signature = signing::sign(&signing_key, &session_id)?;

        let record = SessionRecord {
            scope: scope.clone(),
            created_at: Utc::now(),
        };
        let session_dek = self.ring.key(DekName::SessionDek).await?;
        self.store
            .set(
                &layout::session_path(&session_id),
                &session_dek,
                &record,
                SetOptions::expires_in(self.config.session_ttl),
            )
            .await?;

        Ok(SessionToken {
            token: format!("{session_id}.{signature}"),
            session_id,
        })
    }

    /// Resolves a token to the user it was issued for.
    ///
    /// Fails closed: malformed tokens, bad signatures, unknown or expired
    /// sessions all come back as `None`, never an error.
    pub async fn session_user(&self, token: &str) -> DataResult<Option<UserScope>> {
        let Some((session_id, signature)) = token.split_once('.') else {
            return Ok(None);
        };

        let signing_key = self.ring.signing_key().await?;
        if !signing::verify(&signing_key, session_id, signature) {
            debug!("rejecting session token with invalid signature");
            return Ok(None);
        }

        let session_dek = self.ring.key(DekName::SessionDek).await?;
        let record: Option<SessionRecord> = self
            .store
            .get(&layout::session_path(session_id), &session_dek)
            .await?;
        Ok(record.map(|r| r.scope))
    }

    /// Deletes the session behind a token. Invalid tokens are a no-op.
    pub async fn end_session(&self, token: &str) -> DataResult<()> {
        let Some((session_id, signature)) = token.split_once('.') else {
            return Ok(());
        };
        let signing_key = self.ring.signing_key().await?;
        if !signing::verify(&signing_key, session_id, signature) {
            return Ok(());
        }
        self.store.delete(&layout::session_path(session_id)).await?;
        Ok(())
    }
}
