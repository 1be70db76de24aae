//! In-memory storage backend

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::Result;

/// Storage that disappears with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve_delete() {
        let store = MemoryStore::new();

        store.store("a", b"1").await.unwrap();
        assert_eq!(store.retrieve("a").await.unwrap(), Some(b"1".to_vec()));
        assert!(store.exists("a").await.unwrap());

        store.delete("a").await.unwrap();
        assert_eq!(store.retrieve("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let store = MemoryStore::new();
        store.store("masterPasswordHash", b"h").await.unwrap();
        store.store("masterPasswordSalt", b"s").await.unwrap();
        store.store("theme", b"dark").await.unwrap();

        let mut keys = store.list_keys("masterPassword").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["masterPasswordHash", "masterPasswordSalt"]);

        store.clear().await.unwrap();
        assert!(store.list_keys("").await.unwrap().is_empty());
    }
}
