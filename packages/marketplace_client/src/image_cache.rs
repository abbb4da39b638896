//! Wallet image URL cache keyed by metadata hash.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

/// Location of the durable cache file; unset keeps the cache in memory
pub const IMAGE_CACHE_PATH_ENV: &str = "IMAGE_CACHE_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedImage {
    pub wallet_address: String,
    pub metadata_hash: String,
    pub image_url: String,
}

#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Insert, or replace the entry with the same `metadata_hash`
    async fn save(&self, wallet_address: &str, metadata_hash: &str, image_url: &str) -> ClientResult<()>;
    async fn get(&self, metadata_hash: &str) -> ClientResult<Option<String>>;
}

#[derive(Debug, Default)]
pub struct MemoryImageCache {
    entries: RwLock<HashMap<String, CachedImage>>,
}

impl MemoryImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ImageCache for MemoryImageCache {
    async fn save(&self, wallet_address: &str, metadata_hash: &str, image_url: &str) -> ClientResult<()> {
        let entry = CachedImage {
            wallet_address: wallet_address.to_string(),
            metadata_hash: metadata_hash.to_string(),
            image_url: image_url.to_string(),
        };
        self.entries
            .write()
            .await
            .insert(metadata_hash.to_string(), entry);
        debug!(metadata_hash, "image url cached");
        Ok(())
    }

    async fn get(&self, metadata_hash: &str) -> ClientResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .await
            .get(metadata_hash)
            .map(|entry| entry.image_url.clone()))
    }
}

/// JSON file cache that survives restarts
#[derive(Debug)]
pub struct FileImageCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileImageCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> ClientResult<HashMap<String, CachedImage>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::Storage(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ClientError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn store(&self, entries: &HashMap<String, CachedImage>) -> ClientResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ClientError::Storage(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl ImageCache for FileImageCache {
    async fn save(&self, wallet_address: &str, metadata_hash: &str, image_url: &str) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(
            metadata_hash.to_string(),
            CachedImage {
                wallet_address: wallet_address.to_string(),
                metadata_hash: metadata_hash.to_string(),
                image_url: image_url.to_string(),
            },
        );
        self.store(&entries).await?;
        debug!(metadata_hash, path = %self.path.display(), "image url persisted");
        Ok(())
    }

    async fn get(&self, metadata_hash: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .remove(metadata_hash)
            .map(|entry| entry.image_url))
    }
}

static GLOBAL_CACHE: OnceLock<Arc<MemoryImageCache>> = OnceLock::new();

/// Process-wide cache, created on first use and never torn down
pub fn global_cache() -> Arc<MemoryImageCache> {
    GLOBAL_CACHE
        .get_or_init(|| {
            info!("image cache initialized");
            Arc::new(MemoryImageCache::new())
        })
        .clone()
}

/// Cache chosen by [`IMAGE_CACHE_PATH_ENV`]
pub fn image_cache_from_env() -> Arc<dyn ImageCache> {
    image_cache_from_lookup(|name| std::env::var(name).ok())
}

/// A [`FileImageCache`] at the configured path, or the process-wide
/// in-memory cache when no path is set
pub fn image_cache_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Arc<dyn ImageCache> {
    match lookup(IMAGE_CACHE_PATH_ENV).filter(|path| !path.trim().is_empty()) {
        Some(path) => {
            info!(path = path.trim(), "image cache persisted to file");
            Arc::new(FileImageCache::new(path.trim()))
        }
        None => global_cache(),
    }
}
