//! Symmetric encryption and signing primitives for habitkeep.
//!
//! Provides:
//! - AES-256-GCM authenticated encryption with the fixed
//!   `IV || ciphertext+tag` storage format
//! - PBKDF2-HMAC-SHA256 derivation for string-derived keys
//! - HMAC-SHA256 signing of opaque identifiers
//! - Secure key handling with zeroization
//!
//! # Architecture
//!
//! Every key in the hierarchy is a plain 256-bit [`SymmetricKey`]; the
//! tiers (KEK, DEK, uuDEK) differ only in what encrypts them, which is
//! the concern of `habitkeep-keys`. This crate knows nothing about
//! storage or the hierarchy — it encrypts bytes under a key it is handed.

mod cipher;
mod error;
mod key;
pub mod signing;

pub use cipher::{
    decrypt, decrypt_from_bytes, encrypt, encrypt_to_bytes, EncryptedData, NONCE_SIZE, TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, generate_random_key, KdfParams, SymmetricKey, KEY_SIZE};
