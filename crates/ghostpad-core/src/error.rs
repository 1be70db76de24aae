//! Error types for ghostpad-core

use thiserror::Error;

/// Result type alias for cryptographic core operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Cryptographic core error types
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("No session key - data cannot be recovered in this session")]
    NoKey,

    #[error("Authentication failed - data was tampered with or the key is wrong")]
    AuthenticationFailed,

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Cryptographic primitive unavailable: {0}")]
    Unavailable(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("No password has been set")]
    PasswordNotSet,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CryptoError {
    /// Whether this failure means the data is permanently unreadable with the
    /// key material at hand (as opposed to a usage or environment problem).
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, CryptoError::NoKey | CryptoError::AuthenticationFailed)
    }
}
