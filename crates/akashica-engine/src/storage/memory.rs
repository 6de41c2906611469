//! In-memory [`KvStore`], used to keep integration tests fast and free of
//! filesystem fixtures. Not exposed behind the `s3` feature gate — it has
//! no relation to object-store wiring, just a `Mutex<HashMap<..>>`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::kv::{KvError, KvResult, KvStore};

#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        self.data
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| KvError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> KvResult<()> {
        self.data.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> KvResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .data
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> KvResult<bool> {
        Ok(self.data.lock().unwrap().contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip() {
        let store = InMemoryStore::new();
        store.put("a/b", b"hi".to_vec()).await.unwrap();
        assert!(store.exists("a/b").await.unwrap());
        assert_eq!(store.get("a/b").await.unwrap(), b"hi");
        assert_eq!(store.list("a").await.unwrap(), vec!["a/b".to_string()]);
        store.delete("a/b").await.unwrap();
        assert!(!store.exists("a/b").await.unwrap());
    }

    #[tokio::test]
    async fn get_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(store.get("nope").await, Err(KvError::NotFound(_))));
    }
}
