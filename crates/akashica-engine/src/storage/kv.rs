//! Raw key/blob storage contract (spec §4.1) and its two adapters.
//!
//! `KvStore` is the narrow, blocking-equivalent interface every storage
//! backend implements. Everything above it — objects, manifests, commits,
//! branches, workspaces, tombstones — is a typed view over this one
//! primitive, keyed per the layout in `storage::keys`.

use async_trait::async_trait;

/// Distinguishes "the key does not exist" from every other failure, so
/// callers above can map it to `file-not-found` / `*-not-found` error
/// kinds instead of a generic storage error.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type KvResult<T> = std::result::Result<T, KvError>;

/// Untyped key/blob storage backend.
///
/// Adapters guarantee durable, atomic per-key writes: after a successful
/// `put`, a subsequent `get` on the same key in the same process observes
/// exactly those bytes. No multi-key atomicity is provided.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> KvResult<Vec<u8>>;
    async fn put(&self, key: &str, data: Vec<u8>) -> KvResult<()>;
    async fn delete(&self, key: &str) -> KvResult<()>;
    async fn list(&self, prefix: &str) -> KvResult<Vec<String>>;
    async fn exists(&self, key: &str) -> KvResult<bool>;

    /// Compare-and-swap a single key's contents.
    ///
    /// `expected` is the bytes the caller last observed (`None` meaning the
    /// key was absent). Succeeds only if the stored value still matches;
    /// fails with [`KvError::NotFound`]-shaped semantics are not used here —
    /// a CAS mismatch is reported as `Ok(false)`, distinct from a hard error.
    ///
    /// The default implementation is a read-then-write race: it is only
    /// safe under a caller-held lock (the engine always calls this through
    /// `Repository`'s per-branch lock) or on a backend that happens to
    /// serialize writes. Backends with a real if-match primitive should
    /// override this.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
    ) -> KvResult<bool> {
        let current = match self.get(key).await {
            Ok(bytes) => Some(bytes),
            Err(KvError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        if current.as_deref() != expected {
            return Ok(false);
        }
        self.put(key, new).await?;
        Ok(true)
    }
}
