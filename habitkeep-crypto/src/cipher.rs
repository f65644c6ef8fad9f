//! AES-256-GCM authenticated encryption.
//!
//! Wire format is fixed: a fresh random 12-byte IV followed by the
//! GCM ciphertext with its 16-byte tag (`IV || ciphertext+tag`). Every
//! encrypt call draws a new IV; an IV is never reused under the same key.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// AES-GCM IV size in bytes.
pub const NONCE_SIZE: usize = 12;
/// GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// An encrypted payload: IV plus ciphertext-with-tag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedData {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Total encrypted size in bytes.
    pub fn len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Serializes to the storage format: `IV || ciphertext+tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parses the storage format back into its parts.
    ///
    /// Anything shorter than an IV plus a GCM tag cannot be a valid
    /// record and is rejected up front.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Format(format!(
                "ciphertext too short: {} bytes",
                bytes.len()
            )));
        }
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);
        Ok(Self {
            nonce,
            ciphertext: bytes[NONCE_SIZE..].to_vec(),
        })
    }
}

/// Encrypts `plaintext` under `key` with a fresh random IV.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption("AES-GCM encrypt failed".to_string()))?;

    Ok(EncryptedData { nonce, ciphertext })
}

/// Decrypts an [`EncryptedData`] record.
///
/// Fails on a wrong key or any tampering — GCM authenticates the whole
/// ciphertext.
pub fn decrypt(key: &SymmetricKey, encrypted: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    cipher
        .decrypt(
            Nonce::from_slice(&encrypted.nonce),
            encrypted.ciphertext.as_ref(),
        )
        .map_err(|_| {
            CryptoError::Decryption("AES-GCM decrypt failed (wrong key or tampered data)".to_string())
        })
}

/// Encrypts straight to the storage byte format.
pub fn encrypt_to_bytes(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    Ok(encrypt(key, plaintext)?.to_bytes())
}

/// Decrypts from the storage byte format.
pub fn decrypt_from_bytes(key: &SymmetricKey, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
    decrypt(key, &EncryptedData::from_bytes(bytes)?)
}
