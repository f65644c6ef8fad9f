//! Data layer configuration.

use habitkeep_crypto::KdfParams;
use std::time::Duration;

/// Environment variable overriding the key-derivation salt.
pub const DERIVE_SALT_ENV: &str = "HABITKEEP_DERIVE_SALT";
/// Environment variable overriding the PBKDF2 iteration count.
pub const DERIVE_ITERATIONS_ENV: &str = "HABITKEEP_DERIVE_ITERATIONS";

/// Tunables for the data layer.
#[derive(Clone, Debug)]
pub struct DataConfig {
    /// PBKDF2 parameters for every string-derived key path.
    pub kdf: KdfParams,

    /// TTL applied to every write of a public (guest) user — their data
    /// vanishes this long after the last write.
    pub guest_ttl: Duration,

    /// TTL on session records.
    pub session_ttl: Duration,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            guest_ttl: Duration::from_secs(14 * 24 * 60 * 60),
            session_ttl: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl DataConfig {
    /// Defaults overridden by the environment where set. Malformed values
    /// fall back to the defaults rather than failing the boot — only the
    /// KEK is load-bearing enough to refuse startup over.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(salt) = std::env::var(DERIVE_SALT_ENV) {
            if !salt.is_empty() {
                config.kdf.salt = salt.into_bytes();
            }
        }
        if let Ok(raw) = std::env::var(DERIVE_ITERATIONS_ENV) {
            if let Ok(iterations) = raw.parse::<u32>() {
                if iterations > 0 {
                    config.kdf.iterations = iterations;
                }
            }
        }
        config
    }
}
