//! Local filesystem [`KvStore`]: stores each key as a file under a root
//! directory, creating parent directories on write.

use async_trait::async_trait;
use std::path::PathBuf;

use super::kv::{KvError, KvResult, KvStore};

/// Stores every key as a file under `root`, with `/`-separated keys
/// mapped straight onto nested directories.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl KvStore for LocalStore {
    async fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(KvError::NotFound(key.to_string()))
            }
            Err(e) => Err(KvError::Other(e.into())),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> KvResult<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| KvError::Other(e.into()))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| KvError::Other(e.into()))
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KvError::Other(e.into())),
        }
    }

    async fn list(&self, prefix: &str) -> KvResult<Vec<String>> {
        let dir = self.root.join(prefix);
        let mut entries = Vec::new();
        if !dir.exists() {
            return Ok(entries);
        }
        let mut stack = vec![dir.clone()];
        while let Some(current) = stack.pop() {
            let mut read_dir = tokio::fs::read_dir(&current)
                .await
                .map_err(|e| KvError::Other(e.into()))?;
            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| KvError::Other(e.into()))?
            {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    if let Some(key) = relative.to_str() {
                        entries.push(key.replace('\\', "/"));
                    }
                }
            }
        }
        Ok(entries)
    }

    async fn exists(&self, key: &str) -> KvResult<bool> {
        Ok(self.root.join(key).exists())
    }
}
