//! Key Encryption Key — the root of the hierarchy.
//!
//! Supplied as a hex-encoded environment variable, never persisted in
//! plaintext. A missing or malformed value is a fatal boot error: the
//! process refuses to serve without its KEK.

use crate::error::{KeyError, KeyResult};
use habitkeep_crypto::{generate_random_key, SymmetricKey, KEY_SIZE};

/// Environment variable holding the hex-encoded KEK.
pub const KEK_ENV: &str = "HABITKEEP_KEK";

/// The root key. Lives only in process memory for the process lifetime.
pub struct Kek {
    key: SymmetricKey,
}

impl Kek {
    /// Loads the KEK from [`KEK_ENV`]. Fatal if absent or malformed.
    pub fn from_env() -> KeyResult<Self> {
        let hex_value = std::env::var(KEK_ENV)
            .map_err(|_| KeyError::Config(format!("{KEK_ENV} is not set; refusing to start")))?;
        Self::from_hex(&hex_value)
    }

    /// Parses a hex-encoded 256-bit KEK.
    pub fn from_hex(hex_value: &str) -> KeyResult<Self> {
        let bytes = hex::decode(hex_value.trim())
            .map_err(|_| KeyError::Config(format!("{KEK_ENV} is not valid hex")))?;
        if bytes.len() != KEY_SIZE {
            return Err(KeyError::Config(format!(
                "{KEK_ENV} must decode to {KEY_SIZE} bytes, got {}",
                bytes.len()
            )));
        }
        let key = SymmetricKey::from_slice(&bytes)?;
        Ok(Self { key })
    }

    /// Generates a fresh KEK and its hex form for one-time operator display.
    pub fn generate() -> (Self, String) {
        let key = generate_random_key();
        let hex_value = hex::encode(key.as_bytes());
        (Self { key }, hex_value)
    }

    pub fn key(&self) -> &SymmetricKey {
        &self.key
    }
}

impl std::fmt::Debug for Kek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Kek(..)")
    }
}
