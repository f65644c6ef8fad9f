//! Key material: random generation and PBKDF2 string-to-key derivation.

use crate::error::{CryptoError, CryptoResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric key. Zeroized on drop.
///
/// Serializable so the key ring can be persisted as a single record —
/// the ring is always envelope-encrypted before it touches storage.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice, rejecting anything but exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

// Keys must never leak through logs or error chains.
impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Generates a fresh random 256-bit key.
pub fn generate_random_key() -> SymmetricKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rng().fill_bytes(&mut bytes);
    SymmetricKey(bytes)
}

/// PBKDF2-HMAC-SHA256 parameters for string-derived keys.
///
/// The salt and iteration count are operator-tunable through the
/// environment (see `habitkeep-data`); these defaults are compiled in.
#[derive(Clone, Debug)]
pub struct KdfParams {
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            salt: b"habitkeep-derive-v1".to_vec(),
            iterations: 100_000,
        }
    }
}

/// Derives a 256-bit key from a secret string via PBKDF2-HMAC-SHA256.
///
/// Deterministic for a given (secret, params) pair.
pub fn derive_key(secret: &str, params: &KdfParams) -> CryptoResult<SymmetricKey> {
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be non-zero".to_string(),
        ));
    }
    let mut out = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), &params.salt, params.iterations, &mut out);
    Ok(SymmetricKey(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_keys_differ() {
        let a = generate_random_key();
        let b = generate_random_key();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn derive_is_deterministic() {
        let params = KdfParams::default();
        let a = derive_key("some secret", &params).unwrap();
        let b = derive_key("some secret", &params).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn derive_depends_on_salt() {
        let a = derive_key("some secret", &KdfParams::default()).unwrap();
        let b = derive_key(
            "some secret",
            &KdfParams {
                salt: b"other-salt".to_vec(),
                iterations: 100_000,
            },
        )
        .unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn zero_iterations_rejected() {
        let params = KdfParams {
            salt: b"salt".to_vec(),
            iterations: 0,
        };
        assert!(derive_key("secret", &params).is_err());
    }

    #[test]
    fn debug_does_not_print_key_bytes() {
        let key = generate_random_key();
        assert_eq!(format!("{key:?}"), "SymmetricKey(..)");
    }
}
