//! AES-256-GCM authenticated encryption
//!
//! Raw seal/open over a key, a 12-byte IV and bytes. The 16-byte
//! authentication tag is appended to the ciphertext, matching the layout the
//! envelopes carry on the wire.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use super::AeadKey;
use crate::error::{CryptoError, Result};

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// GCM nonce length in bytes (96 bits)
pub const IV_LEN: usize = 12;

/// GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

fn cipher(key: &AeadKey) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Unavailable(format!("AES-256-GCM: {}", e)))
}

/// Encrypt `plaintext`, returning `ciphertext || tag`
pub fn seal(key: &AeadKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    cipher(key)?
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| CryptoError::MalformedInput("plaintext too long for AES-GCM".to_string()))
}

/// Decrypt and authenticate `ciphertext || tag`
///
/// Never returns partial plaintext: any tag mismatch is
/// [`CryptoError::AuthenticationFailed`].
pub fn open(key: &AeadKey, iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::MalformedInput(format!(
            "ciphertext shorter than the {}-byte tag",
            TAG_LEN
        )));
    }

    cipher(key)?
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
