//! Shared cryptographic primitives
//!
//! This module provides:
//! - A secure random byte source
//! - AES-256-GCM seal/open over raw key, IV and bytes
//! - PBKDF2-HMAC-SHA256 key derivation
//! - Constant-time string comparison
//! - Zeroize-on-drop key material

mod aead;
mod constant_time;
mod encoding;
mod key_derivation;
mod random;
mod secure_memory;

pub use aead::{open, seal, IV_LEN, KEY_LEN, TAG_LEN};
pub use constant_time::{constant_time_eq, constant_time_eq_counted};
pub use encoding::{decode_base64, encode_base64};
pub use key_derivation::{
    derive_bits, derive_key, KeyDerivationParams, DERIVED_LEN, PBKDF2_ITERATIONS, SALT_LEN,
};
pub use random::{random_array, OsRandom, RandomSource};
pub use secure_memory::AeadKey;
