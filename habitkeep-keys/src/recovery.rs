//! Recovery-record primitives.
//!
//! The recovery secret lives entirely outside the key hierarchy: the
//! record is encrypted under a key derived from the secret itself, so
//! whoever holds the string can decrypt it and nobody else — the operator
//! included. Storage is indexed by a one-way hash of the secret, never the
//! secret itself. A lost secret leaves the record permanently
//! undecryptable, by design.

use crate::error::KeyResult;
use base64::Engine;
use habitkeep_crypto::{derive_key, KdfParams, SymmetricKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Raw secret length in bytes before encoding.
pub const RECOVERY_SECRET_BYTES: usize = 32;

/// Domain salt for deriving the record key from the secret. Fixed — safe,
/// because the secret itself carries 256 bits of entropy.
const RECOVERY_DOMAIN_SALT: &[u8] = b"habitkeep-recovery-v1";

/// The minimal identity needed to find and wipe an account without
/// authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    pub user_id: String,
    pub email: String,
    pub provider: String,
}

/// Generates a fresh recovery secret in its display form (base64url).
pub fn generate_recovery_secret() -> String {
    let mut bytes = [0u8; RECOVERY_SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// One-way lookup index for a secret: hex(SHA-256(secret)).
///
/// The store never holds anything the secret could be recovered from.
pub fn recovery_lookup_index(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Derives the record encryption key from the secret itself.
pub fn recovery_record_key(secret: &str, iterations: u32) -> KeyResult<SymmetricKey> {
    let params = KdfParams {
        salt: RECOVERY_DOMAIN_SALT.to_vec(),
        iterations,
    };
    Ok(derive_key(secret, &params)?)
}
