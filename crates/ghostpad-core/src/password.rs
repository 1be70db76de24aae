//! One-way password hashing and constant-time verification

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::crypto::{
    constant_time_eq, derive_bits, random_array, KeyDerivationParams, OsRandom, RandomSource,
    SALT_LEN,
};
use crate::error::Result;

/// Persisted verifier for a password; the password itself is never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecord {
    /// Hex-encoded 32-byte PBKDF2 output
    pub hash: String,
    /// Hex-encoded 16-byte salt
    pub salt: String,
}

/// PBKDF2-HMAC-SHA256 password hasher
#[derive(Clone)]
pub struct PasswordCredential {
    params: KeyDerivationParams,
    random: Arc<dyn RandomSource>,
}

impl PasswordCredential {
    /// Hasher with the fixed interoperable parameters
    pub fn new() -> Self {
        Self::with_params(KeyDerivationParams::default())
    }

    /// Hasher with custom derivation parameters
    pub fn with_params(params: KeyDerivationParams) -> Self {
        Self {
            params,
            random: Arc::new(OsRandom),
        }
    }

    /// Replace the random source used for salts
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Hash `password` under a fresh random salt
    pub fn hash(&self, password: &str) -> Result<PasswordRecord> {
        let salt: [u8; SALT_LEN] = random_array(self.random.as_ref())?;
        let derived = derive_bits(password, &salt, self.params)?;

        Ok(PasswordRecord {
            hash: hex::encode(derived),
            salt: hex::encode(salt),
        })
    }

    /// Check `password` against a stored hash and salt
    ///
    /// Any failure, including an undecodable salt, is reported as `false`.
    pub fn verify(&self, password: &str, stored_hash_hex: &str, stored_salt_hex: &str) -> bool {
        let salt = match hex::decode(stored_salt_hex) {
            Ok(salt) => salt,
            Err(e) => {
                debug!("Stored salt is not valid hex: {}", e);
                return false;
            }
        };

        match derive_bits(password, &salt, self.params) {
            Ok(derived) => constant_time_eq(&hex::encode(derived), stored_hash_hex),
            Err(e) => {
                debug!("Password derivation failed: {}", e);
                false
            }
        }
    }

    /// Check `password` against an optional stored record
    pub fn verify_record(&self, password: &str, record: Option<&PasswordRecord>) -> bool {
        record.is_some_and(|r| self.verify(password, &r.hash, &r.salt))
    }
}

impl Default for PasswordCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PasswordCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
