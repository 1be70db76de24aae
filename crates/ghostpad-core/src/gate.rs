//! Master-password gate
//!
//! Persists a [`PasswordRecord`] through a [`KeyValueStore`] and tracks, in
//! memory only, whether the password has been entered during this session.
//! The enabled flag, hash and salt travel together under one key so a record
//! is always replaced or removed wholesale.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};
use crate::password::{PasswordCredential, PasswordRecord};
use crate::storage::KeyValueStore;

/// Storage key holding the serialized gate state
pub const GATE_KEY: &str = "masterPassword";

/// Persisted gate state, written in a single store call
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredGate {
    master_password_enabled: bool,
    master_password_hash: Option<String>,
    master_password_salt: Option<String>,
}

impl StoredGate {
    fn enabled(record: &PasswordRecord) -> Self {
        Self {
            master_password_enabled: true,
            master_password_hash: Some(record.hash.clone()),
            master_password_salt: Some(record.salt.clone()),
        }
    }

    fn into_record(self) -> Option<PasswordRecord> {
        match (
            self.master_password_enabled,
            self.master_password_hash,
            self.master_password_salt,
        ) {
            (true, Some(hash), Some(salt)) => Some(PasswordRecord { hash, salt }),
            _ => None,
        }
    }
}

/// Snapshot of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    /// A password record is configured
    pub enabled: bool,
    /// The password was entered during this session
    pub unlocked: bool,
}

impl GateStatus {
    /// Whether the caller must prompt for the password before showing data
    pub fn requires_unlock(&self) -> bool {
        self.enabled && !self.unlocked
    }
}

/// Password gate over a key-value store
pub struct PasswordGate {
    store: Arc<dyn KeyValueStore>,
    credential: PasswordCredential,
    unlocked: AtomicBool,
}

impl PasswordGate {
    /// Create a gate using the default hashing parameters
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_credential(store, PasswordCredential::new())
    }

    /// Create a gate with a specific hasher
    pub fn with_credential(store: Arc<dyn KeyValueStore>, credential: PasswordCredential) -> Self {
        Self {
            store,
            credential,
            unlocked: AtomicBool::new(false),
        }
    }

    /// Set (or overwrite) the master password
    pub async fn set_password(&self, password: &str) -> Result<()> {
        ensure_not_empty(password)?;

        let credential = self.credential.clone();
        let password = Zeroizing::new(password.to_owned());
        let record = run_blocking(move || credential.hash(&password)).await??;

        self.save(&StoredGate::enabled(&record)).await?;
        self.unlocked.store(true, Ordering::SeqCst);

        info!("Master password set");
        Ok(())
    }

    /// Check a password attempt; success unlocks the gate for this session
    pub async fn verify_password(&self, password: &str) -> Result<bool> {
        let record = self.load_record().await?.ok_or(CryptoError::PasswordNotSet)?;

        let credential = self.credential.clone();
        let password = Zeroizing::new(password.to_owned());
        let valid =
            run_blocking(move || credential.verify(&password, &record.hash, &record.salt)).await?;

        if valid {
            self.unlocked.store(true, Ordering::SeqCst);
            debug!("Master password verified");
        } else {
            warn!("Master password attempt rejected");
        }
        Ok(valid)
    }

    /// Replace the password after checking the current one
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        ensure_not_empty(new_password)?;

        if !self.verify_password(old_password).await? {
            return Err(CryptoError::InvalidPassword);
        }

        self.set_password(new_password).await?;
        info!("Master password changed");
        Ok(())
    }

    /// Delete the stored record and disable the gate
    pub async fn remove_password(&self) -> Result<()> {
        self.save(&StoredGate::default()).await?;
        self.unlocked.store(false, Ordering::SeqCst);

        info!("Master password removed");
        Ok(())
    }

    /// Forget that the password was entered
    pub fn lock(&self) {
        self.unlocked.store(false, Ordering::SeqCst);
        debug!("Password gate locked");
    }

    /// Current gate status
    pub async fn status(&self) -> Result<GateStatus> {
        Ok(GateStatus {
            enabled: self.load_record().await?.is_some(),
            unlocked: self.unlocked.load(Ordering::SeqCst),
        })
    }

    /// Load the stored record, if the gate is enabled
    pub async fn load_record(&self) -> Result<Option<PasswordRecord>> {
        match self.store.retrieve(GATE_KEY).await? {
            Some(bytes) => {
                let stored: StoredGate = serde_json::from_slice(&bytes)?;
                Ok(stored.into_record())
            }
            None => Ok(None),
        }
    }

    async fn save(&self, stored: &StoredGate) -> Result<()> {
        self.store.store(GATE_KEY, &serde_json::to_vec(stored)?).await
    }
}

fn ensure_not_empty(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(CryptoError::MalformedInput(
            "No password provided".to_string(),
        ));
    }
    Ok(())
}

/// PBKDF2 is deliberately slow; keep it off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CryptoError::KeyDerivation(format!("derivation task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyDerivationParams;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    /// Memory store whose writes can be made to fail
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn store(&self, key: &str, value: &[u8]) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CryptoError::Storage("disk full".to_string()));
            }
            self.inner.store(key, value).await
        }

        async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.retrieve(key).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CryptoError::Storage("disk full".to_string()));
            }
            self.inner.delete(key).await
        }

        async fn exists(&self, key: &str) -> Result<bool> {
            self.inner.exists(key).await
        }

        async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
            self.inner.list_keys(prefix).await
        }

        async fn clear(&self) -> Result<()> {
            self.inner.clear().await
        }

        fn backend_name(&self) -> &'static str {
            "Failing Storage"
        }
    }

    fn fast_credential() -> PasswordCredential {
        PasswordCredential::with_params(KeyDerivationParams { iterations: 1_000 })
    }

    fn test_gate() -> (PasswordGate, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let gate = PasswordGate::with_credential(store.clone(), fast_credential());
        (gate, store)
    }

    fn failing_gate() -> (PasswordGate, Arc<FailingStore>) {
        let store = Arc::new(FailingStore::default());
        let gate = PasswordGate::with_credential(store.clone(), fast_credential());
        (gate, store)
    }

    #[tokio::test]
    async fn test_initial_status() {
        let (gate, _store) = test_gate();

        let status = gate.status().await.unwrap();
        assert_eq!(status, GateStatus { enabled: false, unlocked: false });
        assert!(!status.requires_unlock());
    }

    #[tokio::test]
    async fn test_set_then_verify() {
        let (gate, store) = test_gate();

        gate.set_password("hunter2").await.unwrap();
        assert_eq!(
            gate.status().await.unwrap(),
            GateStatus { enabled: true, unlocked: true }
        );

        gate.lock();
        assert!(gate.status().await.unwrap().requires_unlock());

        assert!(!gate.verify_password("hunter3").await.unwrap());
        assert!(gate.status().await.unwrap().requires_unlock());

        assert!(gate.verify_password("hunter2").await.unwrap());
        assert!(!gate.status().await.unwrap().requires_unlock());

        let stored = String::from_utf8(store.retrieve(GATE_KEY).await.unwrap().unwrap()).unwrap();
        assert!(stored.contains("\"masterPasswordEnabled\":true"));
        assert!(stored.contains("masterPasswordHash"));
        assert!(stored.contains("masterPasswordSalt"));
        assert!(!stored.contains("hunter2"));
        assert_eq!(store.list_keys("").await.unwrap(), vec![GATE_KEY.to_string()]);
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let (gate, _store) = test_gate();

        assert!(matches!(
            gate.set_password("").await,
            Err(CryptoError::MalformedInput(_))
        ));
    }

    #[tokio::test]
    async fn test_change_to_empty_password_rejected_before_verifying() {
        let (gate, _store) = test_gate();
        gate.set_password("old").await.unwrap();
        gate.lock();

        assert!(matches!(
            gate.change_password("old", "").await,
            Err(CryptoError::MalformedInput(_))
        ));
        assert!(gate.status().await.unwrap().requires_unlock());
        assert!(gate.verify_password("old").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_without_record() {
        let (gate, _store) = test_gate();

        assert!(matches!(
            gate.verify_password("anything").await,
            Err(CryptoError::PasswordNotSet)
        ));
    }

    #[tokio::test]
    async fn test_change_password_replaces_record() {
        let (gate, _store) = test_gate();
        gate.set_password("old").await.unwrap();
        let before = gate.load_record().await.unwrap().unwrap();

        assert!(matches!(
            gate.change_password("wrong", "new").await,
            Err(CryptoError::InvalidPassword)
        ));

        gate.change_password("old", "new").await.unwrap();
        let after = gate.load_record().await.unwrap().unwrap();

        assert_ne!(before.salt, after.salt);
        assert!(!gate.verify_password("old").await.unwrap());
        assert!(gate.verify_password("new").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_change_keeps_old_password() {
        let (gate, store) = failing_gate();
        gate.set_password("old").await.unwrap();
        let before = gate.load_record().await.unwrap().unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(matches!(
            gate.change_password("old", "new").await,
            Err(CryptoError::Storage(_))
        ));
        store.fail_writes.store(false, Ordering::SeqCst);

        assert_eq!(gate.load_record().await.unwrap().unwrap(), before);
        assert!(gate.verify_password("old").await.unwrap());
        assert!(!gate.verify_password("new").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_gate_consistent() {
        let (gate, store) = failing_gate();
        gate.set_password("pw").await.unwrap();
        gate.lock();

        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(gate.remove_password().await.is_err());
        store.fail_writes.store(false, Ordering::SeqCst);

        let status = gate.status().await.unwrap();
        assert!(status.enabled);
        assert!(status.requires_unlock());
        assert!(gate.verify_password("pw").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_password() {
        let (gate, _store) = test_gate();
        gate.set_password("pw").await.unwrap();

        gate.remove_password().await.unwrap();

        assert_eq!(
            gate.status().await.unwrap(),
            GateStatus { enabled: false, unlocked: false }
        );
        assert!(gate.load_record().await.unwrap().is_none());
        assert!(matches!(
            gate.verify_password("pw").await,
            Err(CryptoError::PasswordNotSet)
        ));
    }

    #[tokio::test]
    async fn test_incomplete_record_is_absent() {
        let (gate, store) = test_gate();
        store
            .store(GATE_KEY, br#"{"masterPasswordEnabled":true,"masterPasswordHash":"00"}"#)
            .await
            .unwrap();

        assert!(gate.load_record().await.unwrap().is_none());
        assert!(!gate.status().await.unwrap().enabled);
    }
}
