//! Durable storage for sealed-bid secrets.
//!
//! Entries are plain key/value strings under `blind-secret-<auction_id>` and
//! `blind-amount-<auction_id>`, written at commit time and read back at
//! reveal time, possibly by a later process.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

pub fn secret_key(auction_id: u64) -> String {
    format!("blind-secret-{auction_id}")
}

pub fn amount_key(auction_id: u64) -> String {
    format!("blind-amount-{auction_id}")
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> ClientResult<()>;
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;
    async fn remove(&self, key: &str) -> ClientResult<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// JSON file store that survives restarts
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> ClientResult<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ClientError::Storage(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ClientError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn save(&self, entries: &HashMap<String, String>) -> ClientResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ClientError::Storage(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), entries = entries.len(), "secret store saved");
        Ok(())
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn put(&self, key: &str, value: &str) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}
