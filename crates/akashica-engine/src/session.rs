//! Session layer: a single changeset reference — either a
//! read-only commit or a read-write workspace — with one uniform API.
//! Dispatch is a `match` on the reference, not a trait hierarchy: the
//! two cases differ enough (workspaces need a base commit for overlay
//! fallback, commits have none) that a shared trait would just hide the
//! branch behind a vtable.

use akashica_core::{CommitId, DirEntry, Error, PathChange, RepoPath, Result, WorkspaceId};

use crate::storage::StorageAdapter;
use crate::tree;
use crate::workspace;

/// What a [`Session`] is reading from (and, for workspaces, writing to).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangesetRef {
    /// A committed, immutable tree.
    Commit(CommitId),
    /// A workspace, identified by id, overlaying its recorded base commit.
    Workspace(WorkspaceId),
}

pub struct Session<'s, S: StorageAdapter + ?Sized> {
    storage: &'s S,
    changeset: ChangesetRef,
}

impl<'s, S: StorageAdapter + ?Sized> Session<'s, S> {
    pub fn new(storage: &'s S, changeset: ChangesetRef) -> Self {
        Self { storage, changeset }
    }

    pub fn changeset(&self) -> &ChangesetRef {
        &self.changeset
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.changeset, ChangesetRef::Commit(_))
    }

    async fn workspace_base(&self, workspace: &WorkspaceId) -> Result<CommitId> {
        Ok(self.storage.read_workspace_metadata(workspace).await?.base)
    }

    pub async fn read_file(&self, path: &RepoPath) -> Result<Vec<u8>> {
        match &self.changeset {
            ChangesetRef::Commit(commit) => tree::read_commit_file(self.storage, commit, path).await,
            ChangesetRef::Workspace(ws) => {
                let base = self.workspace_base(ws).await?;
                workspace::read_file(self.storage, ws, &base, path).await
            }
        }
    }

    pub async fn file_exists(&self, path: &RepoPath) -> Result<bool> {
        match &self.changeset {
            ChangesetRef::Commit(commit) => {
                match tree::read_commit_file(self.storage, commit, path).await {
                    Ok(_) => Ok(true),
                    Err(Error::FileNotFound(_)) => Ok(false),
                    Err(other) => Err(other),
                }
            }
            ChangesetRef::Workspace(ws) => {
                let base = self.workspace_base(ws).await?;
                workspace::file_exists(self.storage, ws, &base, path).await
            }
        }
    }

    pub async fn list_directory(&self, path: &RepoPath) -> Result<Vec<DirEntry>> {
        match &self.changeset {
            ChangesetRef::Commit(commit) => {
                let entries = tree::read_commit_directory(self.storage, commit, path).await?;
                let mut out: Vec<DirEntry> = entries
                    .into_iter()
                    .map(|e| DirEntry {
                        name: e.name,
                        kind: e.kind,
                        hash: e.hash,
                        size: e.size,
                    })
                    .collect();
                out.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(out)
            }
            ChangesetRef::Workspace(ws) => {
                let base = self.workspace_base(ws).await?;
                workspace::list_directory(self.storage, ws, &base, path).await
            }
        }
    }

    fn require_writable(&self) -> Result<&WorkspaceId> {
        match &self.changeset {
            ChangesetRef::Workspace(ws) => Ok(ws),
            ChangesetRef::Commit(_) => Err(Error::SessionReadOnly),
        }
    }

    pub async fn write_file(&self, path: &RepoPath, data: Vec<u8>) -> Result<()> {
        let ws = self.require_writable()?;
        let base = self.workspace_base(ws).await?;
        workspace::write_file(self.storage, ws, &base, path, data).await
    }

    pub async fn delete_file(&self, path: &RepoPath) -> Result<()> {
        let ws = self.require_writable()?;
        let base = self.workspace_base(ws).await?;
        workspace::delete_file(self.storage, ws, &base, path).await
    }

    pub async fn move_file(&self, from: &RepoPath, to: &RepoPath) -> Result<()> {
        let ws = self.require_writable()?;
        let base = self.workspace_base(ws).await?;
        workspace::move_file(self.storage, ws, &base, from, to).await
    }

    /// Changes relative to the session's own base (workspaces only;
    /// a commit session has nothing to compare against itself).
    pub async fn status(&self) -> Result<Vec<PathChange>> {
        let ws = self.require_writable()?;
        let base = self.workspace_base(ws).await?;
        workspace::status(self.storage, ws, &base).await
    }

    /// Changes relative to an arbitrary commit.
    pub async fn diff(&self, against: &CommitId) -> Result<Vec<PathChange>> {
        match &self.changeset {
            ChangesetRef::Commit(commit) => {
                tree::diff_commits(self.storage, commit, against).await
            }
            ChangesetRef::Workspace(ws) => {
                let base = self.workspace_base(ws).await?;
                workspace::diff(self.storage, ws, &base, against).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest;
    use crate::storage::LocalStore;
    use akashica_core::{EntryKind, ManifestEntry, WorkspaceMetadata};
    use chrono::Utc;

    async fn seed_commit(storage: &LocalStore) -> CommitId {
        let entries = vec![ManifestEntry {
            name: "a.txt".into(),
            hash: storage.write_object(b"hello".to_vec()).await.unwrap(),
            size: 5,
            kind: EntryKind::File,
        }];
        let bytes = manifest::serialize(&entries);
        let root_hash = storage.write_manifest(bytes).await.unwrap();
        storage
            .write_root_manifest(&"@1".to_string(), &root_hash)
            .await
            .unwrap();
        "@1".to_string()
    }

    #[tokio::test]
    async fn commit_session_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let commit = seed_commit(&storage).await;
        let session = Session::new(&storage, ChangesetRef::Commit(commit));

        assert!(session.is_read_only());
        let err = session
            .write_file(&RepoPath::parse("a.txt"), b"x".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SessionReadOnly));
    }

    #[tokio::test]
    async fn workspace_session_writes_are_visible() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let commit = seed_commit(&storage).await;
        let ws = "@1$w1".to_string();
        storage
            .write_workspace_metadata(
                &ws,
                &WorkspaceMetadata {
                    base: commit.clone(),
                    created: Utc::now(),
                    creator: "test".into(),
                },
            )
            .await
            .unwrap();

        let session = Session::new(&storage, ChangesetRef::Workspace(ws));
        assert!(!session.is_read_only());

        session
            .write_file(&RepoPath::parse("b.txt"), b"world".to_vec())
            .await
            .unwrap();
        let data = session.read_file(&RepoPath::parse("b.txt")).await.unwrap();
        assert_eq!(data, b"world");
        assert!(session
            .file_exists(&RepoPath::parse("a.txt"))
            .await
            .unwrap());
    }
}
