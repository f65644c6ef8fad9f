//! Logical key-path layout.
//!
//! Every persisted record lives under one of these prefixes. The rotation
//! engine enumerates scopes by prefix, so additions here must stay
//! list-by-prefix friendly.

/// The encrypted DEK ring record (under the KEK).
pub const DEK_RING_PATH: &str = "crypto/env";

/// Prefix of all per-user uuDEK records (under the user-record DEK).
pub const UUDEK_PREFIX: &str = "crypto/keys/user_dek/";

/// Prefix of all recovery records (self-keyed).
pub const RECOVERY_PREFIX: &str = "crypto/recoverykeys/";

/// Prefix of all session records (under the session DEK).
pub const SESSION_PREFIX: &str = "session/";

/// Prefix of all user-scoped domain records.
pub const USER_PREFIX: &str = "user/";

/// Derived-key prefix marking public (guest) users.
pub const PUBLIC_USER_KEY_PREFIX: &str = "public_";

pub fn uudek_path(user_key: &str) -> String {
    format!("{UUDEK_PREFIX}{user_key}/keys")
}

pub fn recovery_path(lookup_index: &str) -> String {
    format!("{RECOVERY_PREFIX}{lookup_index}")
}

pub fn session_path(session_id: &str) -> String {
    format!("{SESSION_PREFIX}{session_id}")
}

pub fn user_prefix(user_key: &str) -> String {
    format!("{USER_PREFIX}{user_key}/")
}

pub fn profile_path(user_key: &str) -> String {
    format!("{USER_PREFIX}{user_key}/profile")
}

pub fn settings_path(user_key: &str) -> String {
    format!("{USER_PREFIX}{user_key}/settings")
}

pub fn content_path(user_key: &str) -> String {
    format!("{USER_PREFIX}{user_key}/content")
}

pub fn entry_path(user_key: &str, date: &str) -> String {
    format!("{USER_PREFIX}{user_key}/entries/{date}")
}

pub fn entries_prefix(user_key: &str) -> String {
    format!("{USER_PREFIX}{user_key}/entries/")
}

/// True for the key path of a settings record (`user/<uk>/settings`).
pub fn is_settings_path(path: &str) -> bool {
    path.starts_with(USER_PREFIX) && path.ends_with("/settings")
}
