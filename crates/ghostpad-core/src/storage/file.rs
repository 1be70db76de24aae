//! JSON file storage backend
//!
//! Stores entries in a single `ghostpad.json` file in the user's data
//! directory. Values are base64-encoded so arbitrary bytes survive the trip.
//! The file is read on first access, so a freshly opened store never writes
//! over entries it has not seen.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use super::KeyValueStore;
use crate::crypto::{decode_base64, encode_base64};
use crate::error::{CryptoError, Result};

/// File storage backend
pub struct FileStore {
    /// Directory for storage files
    storage_dir: PathBuf,
    /// In-memory cache of the storage
    cache: RwLock<StorageCache>,
}

/// In-memory representation of stored data
#[derive(Debug, Default)]
struct StorageCache {
    /// Map of key -> base64 value
    entries: HashMap<String, String>,
    /// Whether the cache has been modified since last save
    dirty: bool,
    /// Whether the file on disk has been read into the cache
    loaded: bool,
}

/// File format for persistent storage
#[derive(Debug, Serialize, Deserialize)]
struct StorageFile {
    version: u32,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Create a file store in the default data directory
    pub fn new() -> Result<Self> {
        Self::with_dir(Self::default_dir()?)
    }

    /// Create with a custom storage directory
    pub fn with_dir(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;

        debug!("File storage initialized at: {:?}", storage_dir);

        Ok(Self {
            storage_dir,
            cache: RwLock::new(StorageCache::default()),
        })
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "ghostpad", "ghostpad")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| CryptoError::Storage("Could not determine data directory".to_string()))
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn storage_file_path(&self) -> PathBuf {
        self.storage_dir.join("ghostpad.json")
    }

    /// Load storage from disk, replacing the cache
    pub async fn load(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        self.read_file(&mut cache).await
    }

    /// Load storage on first use
    async fn ensure_loaded(&self) -> Result<()> {
        if self.cache.read().await.loaded {
            return Ok(());
        }

        let mut cache = self.cache.write().await;
        if !cache.loaded {
            self.read_file(&mut cache).await?;
        }
        Ok(())
    }

    async fn read_file(&self, cache: &mut StorageCache) -> Result<()> {
        let path = self.storage_file_path();

        if path.exists() {
            let contents = tokio::fs::read_to_string(&path).await?;
            let file: StorageFile = serde_json::from_str(&contents)?;
            cache.entries = file.entries;
            debug!("Loaded {} entries from storage", cache.entries.len());
        } else {
            cache.entries.clear();
            debug!("No existing storage file found");
        }

        cache.dirty = false;
        cache.loaded = true;
        Ok(())
    }

    /// Save storage to disk if anything changed
    async fn save(&self, cache: &mut StorageCache) -> Result<()> {
        if !cache.dirty {
            return Ok(());
        }

        let file = StorageFile {
            version: 1,
            entries: cache.entries.clone(),
        };

        let contents = serde_json::to_string_pretty(&file)?;
        let path = self.storage_file_path();

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        cache.dirty = false;
        debug!("Saved {} entries to storage", cache.entries.len());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_loaded().await?;
        let mut cache = self.cache.write().await;
        cache.entries.insert(key.to_string(), encode_base64(value));
        cache.dirty = true;
        self.save(&mut cache).await?;

        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_loaded().await?;
        let cache = self.cache.read().await;

        match cache.entries.get(key) {
            Some(encoded) => decode_base64(encoded)
                .map(Some)
                .map_err(|e| CryptoError::Storage(format!("Corrupt entry {}: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_loaded().await?;
        let mut cache = self.cache.write().await;

        if cache.entries.remove(key).is_some() {
            cache.dirty = true;
            self.save(&mut cache).await?;
            debug!("Deleted key: {}", key);
        }

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.ensure_loaded().await?;
        Ok(self.cache.read().await.entries.contains_key(key))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.ensure_loaded().await?;
        let cache = self.cache.read().await;

        Ok(cache
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.entries.clear();
        cache.dirty = true;
        cache.loaded = true;
        self.save(&mut cache).await?;

        debug!("Cleared all entries");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "File Storage"
    }
}
