//! Key material with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{random_array, RandomSource, KEY_LEN};
use crate::error::Result;

/// AES-256-GCM key - zeroed when dropped, never serialized
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct AeadKey {
    key: [u8; KEY_LEN],
}

impl AeadKey {
    /// Wrap raw key bytes
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Generate a fresh random key
    pub fn generate(source: &dyn RandomSource) -> Result<Self> {
        random_array(source).map(Self::new)
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for AeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AeadKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::OsRandom;

    #[test]
    fn test_generated_keys_differ() {
        let a = AeadKey::generate(&OsRandom).unwrap();
        let b = AeadKey::generate(&OsRandom).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_debug_redacted() {
        let key = AeadKey::new([0xAB; KEY_LEN]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}
