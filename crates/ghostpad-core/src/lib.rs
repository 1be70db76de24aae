//! # ghostpad-core
//!
//! Cryptographic core for GhostPad including:
//! - Session-only AES-256-GCM encryption with a memory-only key
//! - PBKDF2-HMAC-SHA256 password hashing with constant-time verification
//! - Password-derived encryption for portable exports
//! - A master-password gate over pluggable key-value storage

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod export;
pub mod gate;
pub mod password;
pub mod password_cipher;
pub mod session;
pub mod settings;
pub mod storage;

pub use crypto::{constant_time_eq, AeadKey, KeyDerivationParams, OsRandom, RandomSource};
pub use envelope::{PasswordEnvelope, SessionEnvelope};
pub use error::{CryptoError, Result};
pub use export::{ExportBundle, ExportedNote};
pub use gate::{GateStatus, PasswordGate};
pub use password::{PasswordCredential, PasswordRecord};
pub use password_cipher::{decrypt_with_password, encrypt_with_password, PasswordCipher};
pub use session::{Revealed, SessionCipher};
pub use settings::{Settings, SettingsManager};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
