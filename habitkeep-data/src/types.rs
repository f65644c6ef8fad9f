//! Domain payload types.
//!
//! These are opaque envelope payloads as far as the key hierarchy is
//! concerned — the data layer only fixes their serde shape and where each
//! one lives in the layout.

use chrono::{DateTime, Utc};
use habitkeep_keys::UserScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stored user profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub provider: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user application settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: String,
    pub timezone: String,
    pub reminders_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            timezone: "UTC".to_string(),
            reminders_enabled: false,
        }
    }
}

/// Kind of a tracked habit field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Checkbox,
    Counter,
    Scale,
    Note,
}

/// One tracked habit field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// The user's habit configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    pub fields: Vec<FieldDef>,
}

/// One day's tracked values, keyed by field name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    /// ISO date (`YYYY-MM-DD`) — doubles as the storage key suffix, so
    /// entries list in chronological order.
    pub date: String,
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Everything a user gets back on export or recovery.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportBundle {
    pub profile: Option<UserProfile>,
    pub settings: Option<Settings>,
    pub content: Option<ContentConfig>,
    pub entries: Vec<DayEntry>,
    pub exported_at: DateTime<Utc>,
}

/// Persisted session state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    pub scope: UserScope,
    pub created_at: DateTime<Utc>,
}

/// A freshly issued session.
#[derive(Clone, Debug)]
pub struct SessionToken {
    pub session_id: String,
    /// Opaque value handed to the client: `<session_id>.<signature>`.
    pub token: String,
}

/// Outcome of a recovery attempt.
///
/// Bad key and wrong email are deliberately indistinguishable.
#[derive(Debug)]
pub enum RecoverOutcome {
    /// Account exported and wiped; the recovery record is consumed.
    Recovered(Box<ExportBundle>),
    NotFound,
}

impl RecoverOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecoverOutcome::NotFound)
    }
}
