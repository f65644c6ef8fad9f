//! HMAC-SHA256 signing for opaque identifiers.
//!
//! Produces hex signatures for session and public-user tokens. Independent
//! of the encryption tiers; the signing key rotates through the same
//! machinery as the DEKs, and rotating it is the sole token-invalidation
//! mechanism.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs `data` with the given key, returning a lowercase hex signature.
pub fn sign(key: &SymmetricKey, data: &str) -> CryptoResult<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a hex signature over `data`.
///
/// Fails closed: malformed hex, wrong length, or a bad signature all
/// return `false`. Comparison is constant-time via the `hmac` crate.
pub fn verify(key: &SymmetricKey, data: &str, signature: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
        return false;
    };
    mac.update(data.as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}
