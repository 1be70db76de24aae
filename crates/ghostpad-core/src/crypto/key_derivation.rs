//! Password-based key derivation using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use super::AeadKey;
use crate::error::{CryptoError, Result};

/// Fixed iteration count; must match between hashing and verification
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// Derived output length in bytes (256 bits)
pub const DERIVED_LEN: usize = 32;

/// Parameters for PBKDF2 key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivationParams {
    /// HMAC-SHA256 iterations (default: 100,000)
    pub iterations: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            iterations: PBKDF2_ITERATIONS,
        }
    }
}

/// Derive 256 bits from the UTF-8 bytes of `password` and `salt`
pub fn derive_bits(
    password: &str,
    salt: &[u8],
    params: KeyDerivationParams,
) -> Result<[u8; DERIVED_LEN]> {
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation(
            "iteration count must be non-zero".to_string(),
        ));
    }

    let mut out = [0u8; DERIVED_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, params.iterations, &mut out);
    Ok(out)
}

/// Derive a one-time AES-256-GCM key from a password and salt
pub fn derive_key(password: &str, salt: &[u8], params: KeyDerivationParams) -> Result<AeadKey> {
    derive_bits(password, salt, params).map(AeadKey::new)
}
