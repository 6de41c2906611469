//! Typed storage-adapter contract, layered over any
//! [`KvStore`] via the key layout in [`super::keys`].

use async_trait::async_trait;

use akashica_core::{
    BranchPointer, CommitId, CommitMetadata, ContentHash, CowReference, Error, RepoPath, Result,
    Tombstone, WorkspaceId, WorkspaceMetadata,
};

use super::keys;
use super::kv::{KvError, KvStore};

/// The full read/write surface every repository layer above builds on.
///
/// Blanket-implemented for any [`KvStore`] — this trait only adds typing,
/// (de)serialization, and not-found → domain-error mapping over the raw
/// key/blob primitive.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    // ── Objects ──
    async fn read_object(&self, hash: &ContentHash) -> Result<Vec<u8>>;
    async fn write_object(&self, bytes: Vec<u8>) -> Result<ContentHash>;
    async fn object_exists(&self, hash: &ContentHash) -> Result<bool>;
    async fn delete_object(&self, hash: &ContentHash) -> Result<()>;

    // ── Manifests ──
    async fn read_manifest(&self, hash: &ContentHash) -> Result<Vec<u8>>;
    async fn write_manifest(&self, bytes: Vec<u8>) -> Result<ContentHash>;

    // ── Commits ──
    async fn read_root_manifest(&self, commit: &CommitId) -> Result<ContentHash>;
    async fn write_root_manifest(&self, commit: &CommitId, hash: &ContentHash) -> Result<()>;
    async fn read_commit_metadata(&self, commit: &CommitId) -> Result<CommitMetadata>;
    async fn write_commit_metadata(&self, commit: &CommitId, meta: &CommitMetadata) -> Result<()>;
    async fn commit_exists(&self, commit: &CommitId) -> Result<bool>;

    // ── Branches ──
    async fn list_branches(&self) -> Result<Vec<String>>;
    async fn read_branch(&self, name: &str) -> Result<BranchPointer>;
    /// Compare-and-swap update. `expected` is the head the caller last
    /// observed (`None` if the branch did not exist). Returns
    /// `Ok(())` on success, `Err(Error::BranchConflict { .. })` otherwise.
    async fn update_branch(
        &self,
        name: &str,
        expected: Option<&CommitId>,
        new: &CommitId,
    ) -> Result<()>;

    // ── Workspace metadata ──
    async fn read_workspace_metadata(&self, workspace: &WorkspaceId) -> Result<WorkspaceMetadata>;
    async fn write_workspace_metadata(
        &self,
        workspace: &WorkspaceId,
        meta: &WorkspaceMetadata,
    ) -> Result<()>;
    async fn workspace_exists(&self, workspace: &WorkspaceId) -> Result<bool>;
    async fn delete_workspace(&self, workspace: &WorkspaceId) -> Result<()>;

    // ── Workspace files ──
    async fn read_workspace_file(&self, workspace: &WorkspaceId, path: &RepoPath)
        -> Result<Option<Vec<u8>>>;
    async fn write_workspace_file(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
        data: Vec<u8>,
    ) -> Result<()>;
    async fn delete_workspace_file(&self, workspace: &WorkspaceId, path: &RepoPath) -> Result<()>;

    // ── Workspace overlay manifests ──
    async fn read_workspace_manifest(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
    ) -> Result<Option<Vec<u8>>>;
    async fn write_workspace_manifest(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
        bytes: Vec<u8>,
    ) -> Result<()>;

    // ── Workspace COW references ──
    async fn read_workspace_cow(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
    ) -> Result<Option<CowReference>>;
    async fn write_workspace_cow(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
        cow: &CowReference,
    ) -> Result<()>;
    async fn delete_workspace_cow(&self, workspace: &WorkspaceId, path: &RepoPath) -> Result<()>;

    // ── Tombstones ──
    async fn read_tombstone(&self, hash: &ContentHash) -> Result<Option<Tombstone>>;
    async fn write_tombstone(&self, hash: &ContentHash, tombstone: &Tombstone) -> Result<()>;
    async fn list_tombstones(&self) -> Result<Vec<Tombstone>>;
}

fn map_kv<T>(result: std::result::Result<T, KvError>, not_found: impl FnOnce() -> Error) -> Result<T> {
    match result {
        Ok(v) => Ok(v),
        Err(KvError::NotFound(_)) => Err(not_found()),
        Err(KvError::Other(e)) => Err(Error::Storage(e)),
    }
}

async fn read_optional<K: KvStore + ?Sized>(kv: &K, key: &str) -> Result<Option<Vec<u8>>> {
    match kv.get(key).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(KvError::NotFound(_)) => Ok(None),
        Err(KvError::Other(e)) => Err(Error::Storage(e)),
    }
}

#[async_trait]
impl<K: KvStore> StorageAdapter for K {
    async fn read_object(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        if let Some(tombstone) = self.read_tombstone(hash).await? {
            return Err(Error::ScrubbedContent { tombstone });
        }
        map_kv(self.get(&keys::object(hash)).await, || {
            Error::FileNotFound(hash.clone())
        })
    }

    async fn write_object(&self, bytes: Vec<u8>) -> Result<ContentHash> {
        let hash = crate::hash::sha256_hex(&bytes);
        KvStore::put(self, &keys::object(&hash), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))?;
        Ok(hash)
    }

    async fn object_exists(&self, hash: &ContentHash) -> Result<bool> {
        self.exists(&keys::object(hash))
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn delete_object(&self, hash: &ContentHash) -> Result<()> {
        self.delete(&keys::object(hash))
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn read_manifest(&self, hash: &ContentHash) -> Result<Vec<u8>> {
        map_kv(self.get(&keys::manifest(hash)).await, || {
            Error::InvalidManifest(format!("manifest {hash} not found"))
        })
    }

    async fn write_manifest(&self, bytes: Vec<u8>) -> Result<ContentHash> {
        let hash = crate::hash::sha256_hex(&bytes);
        KvStore::put(self, &keys::manifest(&hash), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))?;
        Ok(hash)
    }

    async fn read_root_manifest(&self, commit: &CommitId) -> Result<ContentHash> {
        let bytes = map_kv(self.get(&keys::commit_root_manifest(commit)).await, || {
            Error::CommitNotFound(commit.clone())
        })?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    async fn write_root_manifest(&self, commit: &CommitId, hash: &ContentHash) -> Result<()> {
        KvStore::put(
            self,
            &keys::commit_root_manifest(commit),
            hash.clone().into_bytes(),
        )
        .await
        .map_err(|e| Error::Storage(e.into()))
    }

    async fn read_commit_metadata(&self, commit: &CommitId) -> Result<CommitMetadata> {
        let bytes = map_kv(self.get(&keys::commit_metadata(commit)).await, || {
            Error::CommitNotFound(commit.clone())
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_commit_metadata(&self, commit: &CommitId, meta: &CommitMetadata) -> Result<()> {
        let bytes = serde_json::to_vec(meta)?;
        KvStore::put(self, &keys::commit_metadata(commit), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn commit_exists(&self, commit: &CommitId) -> Result<bool> {
        self.exists(&keys::commit_metadata(commit))
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn list_branches(&self) -> Result<Vec<String>> {
        let all = self
            .list(keys::branches_prefix())
            .await
            .map_err(|e| Error::Storage(e.into()))?;
        Ok(all
            .into_iter()
            .filter_map(|k| k.strip_prefix("branches/").map(str::to_string))
            .collect())
    }

    async fn read_branch(&self, name: &str) -> Result<BranchPointer> {
        let bytes = map_kv(self.get(&keys::branch(name)).await, || {
            Error::BranchNotFound(name.to_string())
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn update_branch(
        &self,
        name: &str,
        expected: Option<&CommitId>,
        new: &CommitId,
    ) -> Result<()> {
        let key = keys::branch(name);
        let expected_bytes = match expected {
            Some(commit) => Some(serde_json::to_vec(&BranchPointer {
                head: commit.clone(),
            })?),
            None => None,
        };
        let new_bytes = serde_json::to_vec(&BranchPointer { head: new.clone() })?;

        let swapped = self
            .compare_and_swap(&key, expected_bytes.as_deref(), new_bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))?;

        if swapped {
            return Ok(());
        }

        let actual = match self.get(&key).await {
            Ok(bytes) => serde_json::from_slice::<BranchPointer>(&bytes)
                .ok()
                .map(|p| p.head),
            Err(_) => None,
        };
        Err(Error::BranchConflict {
            expected: expected.cloned(),
            actual,
        })
    }

    async fn read_workspace_metadata(&self, workspace: &WorkspaceId) -> Result<WorkspaceMetadata> {
        let bytes = map_kv(self.get(&keys::workspace_metadata(workspace)).await, || {
            Error::WorkspaceNotFound(workspace.clone())
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_workspace_metadata(
        &self,
        workspace: &WorkspaceId,
        meta: &WorkspaceMetadata,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(meta)?;
        KvStore::put(self, &keys::workspace_metadata(workspace), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn workspace_exists(&self, workspace: &WorkspaceId) -> Result<bool> {
        self.exists(&keys::workspace_metadata(workspace))
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn delete_workspace(&self, workspace: &WorkspaceId) -> Result<()> {
        let prefix = keys::workspace_prefix(workspace);
        let all_keys = self
            .list(&prefix)
            .await
            .map_err(|e| Error::Storage(e.into()))?;
        for key in all_keys {
            self.delete(&key).await.map_err(|e| Error::Storage(e.into()))?;
        }
        Ok(())
    }

    async fn read_workspace_file(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
    ) -> Result<Option<Vec<u8>>> {
        read_optional(self, &keys::workspace_file(workspace, path)).await
    }

    async fn write_workspace_file(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
        data: Vec<u8>,
    ) -> Result<()> {
        KvStore::put(self, &keys::workspace_file(workspace, path), data)
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn delete_workspace_file(&self, workspace: &WorkspaceId, path: &RepoPath) -> Result<()> {
        self.delete(&keys::workspace_file(workspace, path))
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn read_workspace_manifest(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
    ) -> Result<Option<Vec<u8>>> {
        read_optional(self, &keys::workspace_manifest(workspace, path)).await
    }

    async fn write_workspace_manifest(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
        bytes: Vec<u8>,
    ) -> Result<()> {
        KvStore::put(self, &keys::workspace_manifest(workspace, path), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn read_workspace_cow(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
    ) -> Result<Option<CowReference>> {
        match read_optional(self, &keys::workspace_cow(workspace, path)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_workspace_cow(
        &self,
        workspace: &WorkspaceId,
        path: &RepoPath,
        cow: &CowReference,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(cow)?;
        KvStore::put(self, &keys::workspace_cow(workspace, path), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn delete_workspace_cow(&self, workspace: &WorkspaceId, path: &RepoPath) -> Result<()> {
        self.delete(&keys::workspace_cow(workspace, path))
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn read_tombstone(&self, hash: &ContentHash) -> Result<Option<Tombstone>> {
        match read_optional(self, &keys::tombstone(hash)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_tombstone(&self, hash: &ContentHash, tombstone: &Tombstone) -> Result<()> {
        let bytes = serde_json::to_vec(tombstone)?;
        KvStore::put(self, &keys::tombstone(hash), bytes)
            .await
            .map_err(|e| Error::Storage(e.into()))
    }

    async fn list_tombstones(&self) -> Result<Vec<Tombstone>> {
        let tomb_keys = self
            .list("objects")
            .await
            .map_err(|e| Error::Storage(e.into()))?;
        let mut out = Vec::new();
        for key in tomb_keys {
            if !key.ends_with(".tomb") {
                continue;
            }
            let bytes = self.get(&key).await.map_err(|e| Error::Storage(e.into()))?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        Ok(out)
    }
}
