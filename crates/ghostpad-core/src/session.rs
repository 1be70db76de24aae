//! Session-scoped encryption
//!
//! A [`SessionCipher`] owns a single AES-256-GCM key that lives only in
//! memory. Envelopes produced under it become permanently unreadable once the
//! key is closed or rotated, which is how "session-only" data is modelled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::crypto::{open, random_array, seal, AeadKey, OsRandom, RandomSource};
use crate::envelope::SessionEnvelope;
use crate::error::{CryptoError, Result};

/// Shown in place of content whose session key is gone
pub const UNRECOVERABLE_NOTICE: &str = "DECRYPTION FAILED\n\n\
This content cannot be decrypted. This happens when:\n\
- the session ended (encryption keys are memory-only)\n\
- the content was encrypted in a different session\n\n\
The encrypted data is intact, but it cannot be recovered in this session.";

/// Outcome of [`SessionCipher::reveal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revealed {
    /// Decryption succeeded
    Plaintext(String),
    /// The envelope cannot be opened with the current session key
    Unrecoverable {
        /// User-facing explanation
        notice: String,
        /// The untouched envelope text
        backup: String,
    },
}

impl Revealed {
    /// Text to display in place of the content
    pub fn display_text(&self, include_backup: bool) -> String {
        match self {
            Revealed::Plaintext(text) => text.clone(),
            Revealed::Unrecoverable { notice, backup } if include_backup => {
                format!("{}\n\n---\nEncrypted content (backup):\n{}", notice, backup)
            }
            Revealed::Unrecoverable { notice, .. } => notice.clone(),
        }
    }

    /// Whether decryption failed
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Revealed::Unrecoverable { .. })
    }
}

/// Encrypts and decrypts text under a memory-only session key
pub struct SessionCipher {
    /// Current session key, if any
    key: RwLock<Option<Arc<AeadKey>>>,
    /// Incremented every time a key is installed
    generation: AtomicU64,
    /// Source for keys and IVs
    random: Arc<dyn RandomSource>,
}

impl SessionCipher {
    /// Create a closed cipher with no key (one is provisioned on first encrypt)
    pub fn new() -> Self {
        Self::with_random(Arc::new(OsRandom))
    }

    /// Create a closed cipher using a specific random source
    pub fn with_random(random: Arc<dyn RandomSource>) -> Self {
        Self {
            key: RwLock::new(None),
            generation: AtomicU64::new(0),
            random,
        }
    }

    /// Create a cipher and generate its session key immediately
    pub async fn open() -> Result<Self> {
        let cipher = Self::new();
        cipher.initialize().await?;
        Ok(cipher)
    }

    /// Install a fresh session key, replacing any existing one
    ///
    /// Every envelope produced under the previous key becomes unrecoverable.
    pub async fn initialize(&self) -> Result<()> {
        let fresh = Arc::new(AeadKey::generate(self.random.as_ref())?);

        let mut key = self.key.write().await;
        let rotated = key.replace(fresh).is_some();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if rotated {
            debug!("Rotated session key (generation {})", generation);
        } else {
            debug!("Generated session key (generation {})", generation);
        }
        Ok(())
    }

    /// Discard the session key
    pub async fn close(&self) {
        if self.key.write().await.take().is_some() {
            debug!("Closed session, key discarded");
        }
    }

    /// True only if the AEAD primitive is usable and a session key exists
    pub async fn is_available(&self) -> bool {
        self.key.read().await.is_some()
    }

    /// Number of keys installed so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Return the current key, creating it exactly once under concurrent first use
    async fn ensure_key(&self) -> Result<Arc<AeadKey>> {
        if let Some(key) = self.key.read().await.as_ref() {
            return Ok(Arc::clone(key));
        }

        let mut slot = self.key.write().await;
        if let Some(key) = slot.as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = Arc::new(AeadKey::generate(self.random.as_ref())?);
        *slot = Some(Arc::clone(&key));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Provisioned session key on first use (generation {})", generation);

        Ok(key)
    }

    /// Encrypt `plaintext` into a base64 session envelope
    ///
    /// Provisions the session key if none exists yet. Empty input yields
    /// `Ok(None)`.
    pub async fn encrypt(&self, plaintext: &str) -> Result<Option<String>> {
        let key = self.ensure_key().await?;

        if plaintext.is_empty() {
            return Ok(None);
        }

        let iv = random_array(self.random.as_ref())?;
        let ciphertext = seal(&key, &iv, plaintext.as_bytes())?;

        Ok(Some(SessionEnvelope { iv, ciphertext }.to_string()))
    }

    /// Decrypt a base64 session envelope
    ///
    /// Fails with [`CryptoError::NoKey`] when the session key is gone; callers
    /// must treat that as permanent. Empty input yields an empty string.
    pub async fn decrypt(&self, envelope: &str) -> Result<String> {
        let key = self
            .key
            .read()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(CryptoError::NoKey)?;

        if envelope.is_empty() {
            return Ok(String::new());
        }

        let parsed = SessionEnvelope::decode(envelope)?;
        let plaintext = open(&key, &parsed.iv, &parsed.ciphertext).map_err(|e| {
            warn!("Session envelope failed authentication");
            e
        })?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::MalformedInput(format!("Invalid UTF-8: {}", e)))
    }

    /// Decrypt, collapsing every failure to `None`
    pub async fn try_decrypt(&self, envelope: &str) -> Option<String> {
        match self.decrypt(envelope).await {
            Ok(text) => Some(text),
            Err(e) if e.is_unrecoverable() => {
                debug!("Session envelope unrecoverable: {}", e);
                None
            }
            Err(e) => {
                warn!("Session decrypt rejected input: {}", e);
                None
            }
        }
    }

    /// Decrypt for display, substituting a notice when the data is unrecoverable
    pub async fn reveal(&self, envelope: &str) -> Revealed {
        match self.try_decrypt(envelope).await {
            Some(text) => Revealed::Plaintext(text),
            None => Revealed::Unrecoverable {
                notice: UNRECOVERABLE_NOTICE.to_string(),
                backup: envelope.to_string(),
            },
        }
    }
}

impl Default for SessionCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCipher")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
