//! Shared helpers for key hierarchy tests.

use habitkeep_keys::{Kek, KeyRing};
use habitkeep_kv::{EnvelopeStore, MemoryKv};
use std::sync::Arc;

/// Envelope store over a fresh in-memory backend.
pub fn fresh_store() -> EnvelopeStore {
    EnvelopeStore::new(Arc::new(MemoryKv::new()))
}

/// Generated KEK plus its hex form (for reload tests).
pub fn fresh_kek() -> (Kek, String) {
    Kek::generate()
}

/// Opt-in log output while debugging: `RUST_LOG=debug cargo test`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Boots a key ring over the given store with a fresh KEK.
pub async fn boot_ring(store: &EnvelopeStore) -> (Arc<KeyRing>, String) {
    init_tracing();
    let (kek, kek_hex) = fresh_kek();
    let ring = KeyRing::load_or_init(store.clone(), kek)
        .await
        .expect("ring must initialize");
    (ring, kek_hex)
}

/// Fast KDF iteration count for tests.
#[allow(dead_code)]
pub fn test_kdf_params() -> habitkeep_crypto::KdfParams {
    habitkeep_crypto::KdfParams {
        salt: b"habitkeep-test-salt".to_vec(),
        iterations: 1_000,
    }
}
