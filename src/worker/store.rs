//! Durable local key-value store.
//!
//! One file per key under the worker's data directory: the filename is the
//! URL-safe encoding of the key, the contents are the JSON envelope
//! `{"value": "..."}`. On open the directory is scanned into an in-memory
//! map, so a key present on disk is visible to the first GET with no
//! network traffic.
//!
//! Writes serialize through a per-key lock and reach the map only after
//! the file is durable (temp file, fsync, atomic rename); the file and the
//! map cannot diverge. Reads are memory-only.

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// On-disk envelope, same shape as the wire value.
#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    value: String,
}

pub struct KeyStore {
    data: DashMap<String, String>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    data_dir: PathBuf,
}

impl KeyStore {
    /// Opens (and creates) the data directory and loads every persisted key.
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;

        let store = Self {
            data: DashMap::new(),
            locks: DashMap::new(),
            data_dir,
        };
        store.load_persisted().await?;

        Ok(store)
    }

    async fn load_persisted(&self) -> Result<()> {
        let mut dir = tokio::fs::read_dir(&self.data_dir)
            .await
            .with_context(|| format!("scanning {}", self.data_dir.display()))?;

        let mut loaded = 0usize;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|ext| ext == "tmp").unwrap_or(false) {
                // Leftover from a write interrupted before rename.
                let _ = tokio::fs::remove_file(&path).await;
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Ok(key) = urlencoding::decode(name) else {
                tracing::warn!("Skipping undecodable data file {}", name);
                continue;
            };

            match tokio::fs::read_to_string(&path).await {
                Ok(raw) => match serde_json::from_str::<StoredValue>(&raw) {
                    Ok(stored) => {
                        self.data.insert(key.into_owned(), stored.value);
                        loaded += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Skipping corrupt data file {}: {}", name, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read data file {}: {}", name, e);
                }
            }
        }

        if loaded > 0 {
            tracing::info!("Loaded {} persisted key(s) from {}", loaded, self.data_dir.display());
        }

        Ok(())
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(urlencoding::encode(key).into_owned())
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Durable write: the call returns only after the value is fsynced and
    /// renamed into place. Re-writing the same (key, value) is a no-op
    /// semantically, which makes replicate and pull redelivery safe.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let path = self.file_path(key);
        let tmp_path = path.with_extension("tmp");
        let raw = serde_json::to_string(&StoredValue {
            value: value.to_string(),
        })?;

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(raw.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("renaming into {}", path.display()))?;

        self.data.insert(key.to_string(), value.to_string());

        Ok(())
    }

    /// Memory-only read path.
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Removes the key and its file. Idempotent; returns whether the key
    /// was present.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let existed = self.data.remove(key).is_some();
        match tokio::fs::remove_file(self.file_path(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(existed)
    }

    pub fn keys(&self) -> Vec<String> {
        self.data.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
