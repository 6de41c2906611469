//! Content scrubbing: irrevocably remove a content
//! object's bytes while leaving an audit record behind.
//!
//! Ordering matters for crash safety: the tombstone is written *before*
//! the object bytes are deleted. If the process dies between the two
//! writes, the hash is left in the "already scrubbed, deletion pending"
//! state rather than the reverse — a live object whose tombstone never
//! got written, which would silently un-scrub it on any later retry.

use akashica_core::{ContentHash, Error, Result, Tombstone};
use chrono::Utc;

use crate::storage::StorageAdapter;

/// Scrub `hash`: tombstone first, delete second. Returns the tombstone
/// that was written. Scrubbing an already-scrubbed hash returns the
/// existing tombstone without erroring — scrub is idempotent.
pub async fn scrub<S: StorageAdapter + ?Sized>(
    storage: &S,
    hash: &ContentHash,
    reason: String,
    deleted_by: String,
) -> Result<Tombstone> {
    if let Some(existing) = storage.read_tombstone(hash).await? {
        return Ok(existing);
    }

    let object_exists = storage.object_exists(hash).await?;
    if !object_exists {
        return Err(Error::FileNotFound(hash.clone()));
    }
    let bytes = storage.read_object(hash).await?;

    let tombstone = Tombstone {
        deleted_hash: hash.clone(),
        reason,
        timestamp: Utc::now(),
        deleted_by,
        original_size: bytes.len() as u64,
    };

    storage.write_tombstone(hash, &tombstone).await?;
    storage.delete_object(hash).await?;

    Ok(tombstone)
}

pub async fn list_scrubbed<S: StorageAdapter + ?Sized>(storage: &S) -> Result<Vec<Tombstone>> {
    storage.list_tombstones().await
}
