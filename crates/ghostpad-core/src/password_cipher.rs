//! Password-derived encryption for portable, self-contained envelopes
//!
//! Each call derives a one-time key from the password and a fresh salt; the
//! key is dropped (and zeroized) before the call returns.

use std::sync::Arc;
use tracing::warn;

use crate::crypto::{
    derive_key, open, random_array, seal, KeyDerivationParams, OsRandom, RandomSource, IV_LEN,
    SALT_LEN,
};
use crate::envelope::PasswordEnvelope;
use crate::error::{CryptoError, Result};

/// AES-256-GCM under a PBKDF2-derived key
#[derive(Clone)]
pub struct PasswordCipher {
    params: KeyDerivationParams,
    random: Arc<dyn RandomSource>,
}

impl PasswordCipher {
    /// Cipher with the fixed interoperable parameters
    pub fn new() -> Self {
        Self::with_params(KeyDerivationParams::default())
    }

    /// Cipher with custom derivation parameters
    pub fn with_params(params: KeyDerivationParams) -> Self {
        Self {
            params,
            random: Arc::new(OsRandom),
        }
    }

    /// Replace the random source used for salts and IVs
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Encrypt `plaintext` into `base64(salt || iv || ciphertext || tag)`
    pub fn encrypt(&self, plaintext: &str, password: &str) -> Result<String> {
        let salt: [u8; SALT_LEN] = random_array(self.random.as_ref())?;
        let iv: [u8; IV_LEN] = random_array(self.random.as_ref())?;

        let key = derive_key(password, &salt, self.params)?;
        let ciphertext = seal(&key, &iv, plaintext.as_bytes())?;

        Ok(PasswordEnvelope { salt, iv, ciphertext }.to_string())
    }

    /// Decrypt an envelope produced by [`PasswordCipher::encrypt`]
    ///
    /// A wrong password is indistinguishable from tampering and yields
    /// [`CryptoError::AuthenticationFailed`].
    pub fn decrypt(&self, envelope: &str, password: &str) -> Result<String> {
        let parsed = PasswordEnvelope::decode(envelope)?;

        let key = derive_key(password, &parsed.salt, self.params)?;
        let plaintext = open(&key, &parsed.iv, &parsed.ciphertext).map_err(|e| {
            warn!("Password envelope failed authentication");
            e
        })?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::MalformedInput(format!("Invalid UTF-8: {}", e)))
    }
}

impl Default for PasswordCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PasswordCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCipher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Encrypt with the default parameters
pub fn encrypt_with_password(plaintext: &str, password: &str) -> Result<String> {
    PasswordCipher::new().encrypt(plaintext, password)
}

/// Decrypt with the default parameters
pub fn decrypt_with_password(envelope: &str, password: &str) -> Result<String> {
    PasswordCipher::new().decrypt(envelope, password)
}
