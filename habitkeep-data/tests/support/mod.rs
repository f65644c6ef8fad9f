//! Shared helpers for data layer tests.

use chrono::Utc;
use habitkeep_data::{
    ContentConfig, DataConfig, DataService, DayEntry, FieldDef, FieldKind, Kek, Settings,
    UserProfile, UserScope,
};
use habitkeep_kv::{KvStore, MemoryKv};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fast KDF settings so tests don't grind through 100k PBKDF2 rounds.
pub fn test_config() -> DataConfig {
    let mut config = DataConfig::default();
    config.kdf.salt = b"habitkeep-test-salt".to_vec();
    config.kdf.iterations = 1_000;
    config
}

/// Service over a fresh in-memory backend.
pub async fn fresh_service() -> DataService {
    service_over(Arc::new(MemoryKv::new())).await
}

/// Service over a caller-supplied backend.
pub async fn service_over(backend: Arc<dyn KvStore>) -> DataService {
    let (kek, _) = Kek::generate();
    DataService::open(backend, kek, test_config())
        .await
        .expect("service must boot")
}

pub fn authed(id: &str) -> UserScope {
    UserScope::Authenticated {
        provider: "github".to_string(),
        id: id.to_string(),
    }
}

#[allow(dead_code)]
pub fn guest(id: &str) -> UserScope {
    UserScope::Public { id: id.to_string() }
}

#[allow(dead_code)]
pub fn sample_profile(id: &str, email: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        email: email.to_string(),
        provider: "github".to_string(),
        display_name: None,
        created_at: Utc::now(),
    }
}

#[allow(dead_code)]
pub fn sample_settings() -> Settings {
    Settings {
        theme: "dark".to_string(),
        timezone: "Europe/Berlin".to_string(),
        reminders_enabled: true,
    }
}

#[allow(dead_code)]
pub fn sample_content() -> ContentConfig {
    ContentConfig {
        fields: vec![
            FieldDef {
                name: "water".to_string(),
                kind: FieldKind::Counter,
            },
            FieldDef {
                name: "meditated".to_string(),
                kind: FieldKind::Checkbox,
            },
        ],
    }
}

#[allow(dead_code)]
pub fn sample_entry(date: &str, water: i64) -> DayEntry {
    let mut values = BTreeMap::new();
    values.insert("water".to_string(), serde_json::json!(water));
    values.insert("meditated".to_string(), serde_json::json!(water % 2 == 0));
    DayEntry {
        date: date.to_string(),
        values,
    }
}
