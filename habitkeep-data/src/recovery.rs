//! Account recovery without authentication.
//!
//! The flow the user sees: ask for a recovery key while signed in, keep it
//! somewhere safe, and later present key + email to pull an export of
//! everything and wipe the account. The record is self-keyed — the raw
//! secret is the decryption key — so the server cannot open it on its own.

use crate::error::{DataError, DataResult};
use crate::service::DataService;
use crate::types::RecoverOutcome;
use habitkeep_keys::{
    generate_recovery_secret, layout, recovery_lookup_index, recovery_record_key, RecoveryRecord,
    UserScope,
};
use habitkeep_kv::SetOptions;
use tracing::info;

impl DataService {
    /// Creates a recovery key for the user and returns it exactly once.
    ///
    /// The raw key is never stored and never logged; only a one-way hash
    /// of it exists server-side, as the record's lookup index. Creating a
    /// second key does not invalidate an earlier one.
    pub async fn create_recovery_key(&self, scope: &UserScope) -> DataResult<String> {
        let profile = self
            .get_user(scope)
            .await?
            .ok_or(DataError::ProfileRequired)?;

        let secret = generate_recovery_secret();
        let index = recovery_lookup_index(&secret);
        let record_key = recovery_record_key(&secret, self.config.kdf.iterations)?;

        let record = RecoveryRecord {
            user_id: profile.id,
            email: profile.email,
            provider: profile.provider,
        };
        self.store
            .set(
                &layout::recovery_path(&index),
                &record_key,
                &record,
                SetOptions::default(),
            )
            .await?;

        info!("issued recovery key");
        Ok(secret)
    }

    /// Redeems a recovery key: on success returns the full account export
    /// and irrevocably wipes the account and the record itself.
    ///
    /// A missing record, an undecryptable record, and a wrong email all
    /// yield the same [`RecoverOutcome::NotFound`] — the caller learns
    /// nothing about which part was wrong. Only the email-match failure
    /// leaves the record in place.
    pub async fn recover_account(&self, raw_key: &str, email: &str) -> DataResult<RecoverOutcome> {
        let index = recovery_lookup_index(raw_key);
        let record_key = recovery_record_key(raw_key, self.config.kdf.iterations)?;

        let record: Option<RecoveryRecord> = self
            .store
            .get(&layout::recovery_path(&index), &record_key)
            .await?;
        let Some(record) = record else {
            return Ok(RecoverOutcome::NotFound);
        };

        if !record.email.eq_ignore_ascii_case(email.trim()) {
            return Ok(RecoverOutcome::NotFound);
        }

        let scope = UserScope::Authenticated {
            provider: record.provider.clone(),
            id: record.user_id.clone(),
        };

        let export = self.export_account(&scope).await?;
        let wiped = self.wipe_user(&scope).await?;
        self.store.delete(&layout::recovery_path(&index)).await?;

        info!(records = wiped, "recovered and wiped account");
        Ok(RecoverOutcome::Recovered(Box::new(export)))
    }
}
