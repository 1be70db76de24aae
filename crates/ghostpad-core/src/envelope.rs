//! Envelope wire formats
//!
//! Session form:  `base64(iv[12] || ciphertext || tag[16])`
//! Password form: `base64(salt[16] || iv[12] || ciphertext || tag[16])`

use crate::crypto::{decode_base64, encode_base64, IV_LEN, SALT_LEN, TAG_LEN};
use crate::error::{CryptoError, Result};

/// Session-key envelope: IV followed by AEAD output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnvelope {
    /// Random per-encryption IV
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the authentication tag appended
    pub ciphertext: Vec<u8>,
}

impl SessionEnvelope {
    /// Raw byte layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the raw byte layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IV_LEN + TAG_LEN {
            return Err(CryptoError::MalformedInput(format!(
                "session envelope too short: {} bytes (minimum {})",
                bytes.len(),
                IV_LEN + TAG_LEN
            )));
        }

        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        let mut iv_arr = [0u8; IV_LEN];
        iv_arr.copy_from_slice(iv);

        Ok(Self {
            iv: iv_arr,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Parse from base64 text
    pub fn decode(text: &str) -> Result<Self> {
        Self::from_bytes(&decode_base64(text)?)
    }
}

impl std::fmt::Display for SessionEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_base64(&self.to_bytes()))
    }
}

/// Password-derived envelope: salt, IV, AEAD output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordEnvelope {
    /// PBKDF2 salt for this envelope only
    pub salt: [u8; SALT_LEN],
    /// Random per-encryption IV
    pub iv: [u8; IV_LEN],
    /// Ciphertext with the authentication tag appended
    pub ciphertext: Vec<u8>,
}

impl PasswordEnvelope {
    /// Raw byte layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SALT_LEN + IV_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the raw byte layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SALT_LEN + IV_LEN + TAG_LEN {
            return Err(CryptoError::MalformedInput(format!(
                "password envelope too short: {} bytes (minimum {})",
                bytes.len(),
                SALT_LEN + IV_LEN + TAG_LEN
            )));
        }

        let (salt, rest) = bytes.split_at(SALT_LEN);
        let (iv, ciphertext) = rest.split_at(IV_LEN);

        let mut salt_arr = [0u8; SALT_LEN];
        salt_arr.copy_from_slice(salt);
        let mut iv_arr = [0u8; IV_LEN];
        iv_arr.copy_from_slice(iv);

        Ok(Self {
            salt: salt_arr,
            iv: iv_arr,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Parse from base64 text
    pub fn decode(text: &str) -> Result<Self> {
        Self::from_bytes(&decode_base64(text)?)
    }
}

impl std::fmt::Display for PasswordEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_base64(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_layout() {
        let envelope = SessionEnvelope {
            iv: [1u8; IV_LEN],
            ciphertext: vec![2u8; TAG_LEN + 3],
        };
        let bytes = envelope.to_bytes();

        assert_eq!(&bytes[..IV_LEN], &[1u8; IV_LEN]);
        assert_eq!(&bytes[IV_LEN..], &[2u8; TAG_LEN + 3][..]);
        assert_eq!(SessionEnvelope::decode(&envelope.to_string()).unwrap(), envelope);
    }

    #[test]
    fn test_password_layout() {
        let envelope = PasswordEnvelope {
            salt: [9u8; SALT_LEN],
            iv: [1u8; IV_LEN],
            ciphertext: vec![2u8; TAG_LEN],
        };
        let bytes = envelope.to_bytes();

        assert_eq!(bytes.len(), SALT_LEN + IV_LEN + TAG_LEN);
        assert_eq!(&bytes[..SALT_LEN], &[9u8; SALT_LEN]);
        assert_eq!(&bytes[SALT_LEN..SALT_LEN + IV_LEN], &[1u8; IV_LEN]);
    }

    #[test]
    fn test_short_envelopes_rejected() {
        assert!(matches!(
            SessionEnvelope::from_bytes(&[0u8; IV_LEN + TAG_LEN - 1]),
            Err(CryptoError::MalformedInput(_))
        ));
        assert!(matches!(
            PasswordEnvelope::from_bytes(&[0u8; SALT_LEN + IV_LEN + TAG_LEN - 1]),
            Err(CryptoError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            SessionEnvelope::decode("%%%"),
            Err(CryptoError::MalformedInput(_))
        ));
        assert!(matches!(
            PasswordEnvelope::decode("not base64!"),
            Err(CryptoError::MalformedInput(_))
        ));
    }
}
