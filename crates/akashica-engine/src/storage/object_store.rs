//! Object-store-backed [`KvStore`] using `opendal`.
//!
//! Any `opendal` service (`services-s3`, `services-fs`, and others) can
//! back this adapter — construction is left to the caller via an
//! already-configured `opendal::Operator`.
//!
//! `opendal` does not expose a generic if-match/precondition primitive
//! across all services, so [`KvStore::compare_and_swap`] here falls back
//! to the advisory read-then-write default: CAS is only implementable on
//! an eventually-consistent object store if the store itself offers a
//! precondition primitive, and most don't, so callers must tolerate lost
//! updates under concurrent writers to the same key.

use async_trait::async_trait;
use opendal::Operator;

use super::kv::{KvError, KvResult, KvStore};

pub struct ObjectStoreBackend {
    op: Operator,
}

impl ObjectStoreBackend {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }
}

#[async_trait]
impl KvStore for ObjectStoreBackend {
    async fn get(&self, key: &str) -> KvResult<Vec<u8>> {
        match self.op.read(key).await {
            Ok(buf) => Ok(buf.to_vec()),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                Err(KvError::NotFound(key.to_string()))
            }
            Err(e) => Err(KvError::Other(e.into())),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> KvResult<()> {
        self.op
            .write(key, data)
            .await
            .map(|_| ())
            .map_err(|e| KvError::Other(e.into()))
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        match self.op.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KvError::Other(e.into())),
        }
    }

    async fn list(&self, prefix: &str) -> KvResult<Vec<String>> {
        let entries = match self.op.list(prefix).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(KvError::Other(e.into())),
        };
        Ok(entries
            .into_iter()
            .filter(|e| !e.path().ends_with('/'))
            .map(|e| e.path().to_string())
            .collect())
    }

    async fn exists(&self, key: &str) -> KvResult<bool> {
        self.op
            .exists(key)
            .await
            .map_err(|e| KvError::Other(e.into()))
    }
}
