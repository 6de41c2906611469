//! Repository orchestrator: the façade tying together
//! storage, commits, branches, workspaces, and scrubbing behind one
//! `&self` API.
//!
//! Branch mutations (publish, reset) are serialised per branch name via
//! `branch_locks`, a `DashMap` of per-key locks keyed to the
//! coarse-grained unit that needs serialising — a branch rather than a
//! whole repository, since independent branches publish independently.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use akashica_core::{
    ChangeKind, CommitId, CommitMetadata, Error, PathChange, Result, Tombstone, WorkspaceId,
    WorkspaceMetadata,
};

use crate::branch;
use crate::commit;
use crate::manifest;
use crate::storage::StorageAdapter;
use crate::tombstone;
use crate::tree;
use crate::workspace;

/// The central orchestration layer for an Akashica repository. Internally
/// concurrent: every method takes `&self`, with branch-level mutual
/// exclusion provided by `branch_locks`.
pub struct Repository<S: StorageAdapter + ?Sized> {
    storage: Arc<S>,
    branch_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: StorageAdapter + ?Sized> Repository<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            branch_locks: DashMap::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn branch_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.branch_locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // ── Workspaces ──

    /// Create a new workspace over `base`. The workspace id is
    /// `<base>$<random-suffix>`.
    pub async fn create_workspace(&self, base: &CommitId, creator: &str) -> Result<WorkspaceId> {
        if !self.storage.commit_exists(base).await? {
            return Err(Error::CommitNotFound(base.clone()));
        }
        let workspace_id = format!("{base}${}", Uuid::new_v4().simple());
        let meta = WorkspaceMetadata {
            base: base.clone(),
            created: Utc::now(),
            creator: creator.to_string(),
        };
        self.storage
            .write_workspace_metadata(&workspace_id, &meta)
            .await?;
        debug!(workspace = %workspace_id, %base, "created workspace");
        Ok(workspace_id)
    }

    /// Create a workspace over the commit a branch currently points at.
    pub async fn create_workspace_from_branch(
        &self,
        branch_name: &str,
        creator: &str,
    ) -> Result<WorkspaceId> {
        let base = branch::head(&*self.storage, branch_name).await?;
        self.create_workspace(&base, creator).await
    }

    pub async fn delete_workspace(&self, workspace: &WorkspaceId) -> Result<()> {
        self.storage.delete_workspace(workspace).await?;
        debug!(%workspace, "deleted workspace");
        Ok(())
    }

    /// Materialize a workspace's overlay into a new commit and fast-forward
    /// `branch_name` to it. Fails with `BranchConflict` if the branch moved
    /// since the workspace was created from it — the caller must rebase
    /// (create a fresh workspace and re-apply) rather than retry blindly.
    pub async fn publish(
        &self,
        workspace: &WorkspaceId,
        branch_name: &str,
        message: &str,
        author: &str,
    ) -> Result<CommitId> {
        let lock = self.branch_lock(branch_name);
        let _guard = lock.lock().await;

        let ws_meta = self.storage.read_workspace_metadata(workspace).await?;
        let current_head = branch::head(&*self.storage, branch_name).await?;
        if current_head != ws_meta.base {
            warn!(
                %workspace, branch = branch_name,
                expected = %ws_meta.base, actual = %current_head,
                "publish rejected: branch advanced since workspace base"
            );
            return Err(Error::BranchConflict {
                expected: Some(ws_meta.base),
                actual: Some(current_head),
            });
        }

        let root_hash = materialize(&*self.storage, workspace, &ws_meta.base).await?;

        let commit_id = format!("@{}", Uuid::new_v4().simple());
        self.storage.write_root_manifest(&commit_id, &root_hash).await?;
        self.storage
            .write_commit_metadata(
                &commit_id,
                &CommitMetadata {
                    message: message.to_string(),
                    author: author.to_string(),
                    timestamp: Utc::now(),
                    parent: Some(ws_meta.base.clone()),
                },
            )
            .await?;

        branch::advance(&*self.storage, branch_name, &current_head, &commit_id).await?;
        self.storage.delete_workspace(workspace).await?;

        info!(%workspace, branch = branch_name, commit = %commit_id, "published workspace");
        Ok(commit_id)
    }

    // ── Branches ──

    pub async fn list_branches(&self) -> Result<Vec<String>> {
        branch::list(&*self.storage).await
    }

    pub async fn current_head(&self, branch_name: &str) -> Result<CommitId> {
        branch::head(&*self.storage, branch_name).await
    }

    pub async fn create_branch(&self, name: &str, at: &CommitId) -> Result<()> {
        branch::create(&*self.storage, name, at).await
    }

    pub async fn reset_branch(
        &self,
        branch_name: &str,
        target: &CommitId,
        force: bool,
    ) -> Result<()> {
        let lock = self.branch_lock(branch_name);
        let _guard = lock.lock().await;
        branch::reset(&*self.storage, branch_name, target, force).await
    }

    // ── Commits ──

    pub async fn commit_metadata(&self, commit: &CommitId) -> Result<CommitMetadata> {
        self.storage.read_commit_metadata(commit).await
    }

    pub async fn commit_history(
        &self,
        head: &CommitId,
        limit: usize,
    ) -> Result<Vec<(CommitId, CommitMetadata)>> {
        commit::history(&*self.storage, head, limit).await
    }

    pub async fn is_ancestor(&self, ancestor: &CommitId, descendant: &CommitId) -> Result<bool> {
        commit::is_ancestor(&*self.storage, ancestor, descendant).await
    }

    pub async fn commits_between(&self, from: &CommitId, to: &CommitId) -> Result<Vec<CommitId>> {
        commit::commits_between(&*self.storage, from, to).await
    }

    // ── Scrubbing ──

    pub async fn scrub(
        &self,
        hash: &akashica_core::ContentHash,
        reason: String,
        deleted_by: String,
    ) -> Result<Tombstone> {
        let result = tombstone::scrub(&*self.storage, hash, reason, deleted_by).await;
        if result.is_ok() {
            warn!(%hash, "content scrubbed");
        }
        result
    }

    pub async fn list_scrubbed(&self) -> Result<Vec<Tombstone>> {
        tombstone::list_scrubbed(&*self.storage).await
    }
}

/// Recursively rebuild every directory manifest under `workspace`,
/// writing each as a real committed object rather than a `__root__`-keyed
/// overlay record, and return the root manifest's hash.
///
/// Directories untouched in the overlay are read straight from `base` and
/// re-written verbatim — they already reference existing objects, so this
/// is pure bookkeeping, not a bytewise copy of file content.
async fn materialize<A: StorageAdapter + ?Sized>(
    storage: &A,
    workspace_id: &WorkspaceId,
    base: &CommitId,
) -> Result<akashica_core::ContentHash> {
    use akashica_core::RepoPath;

    let mut stack = vec![RepoPath::root()];
    let mut hashes: std::collections::HashMap<String, akashica_core::ContentHash> =
        std::collections::HashMap::new();

    // First pass: discover every directory reachable from the overlay
    // (depth order doesn't matter, we resolve children before parents
    // in the second pass).
    let mut all_dirs = Vec::new();
    while let Some(dir) = stack.pop() {
        all_dirs.push(dir.clone());
        let entries = workspace::effective_directory(storage, workspace_id, base, &dir).await?;
        for entry in entries {
            if entry.kind == akashica_core::EntryKind::Directory {
                stack.push(dir.child(&entry.name));
            }
        }
    }

    // Second pass: process deepest directories first so child hashes are
    // known when their parent's manifest is rebuilt.
    all_dirs.sort_by_key(|p| std::cmp::Reverse(p.components().len()));

    for dir in &all_dirs {
        let mut entries = workspace::effective_directory(storage, workspace_id, base, dir).await?;
        for entry in entries.iter_mut() {
            let child_path = dir.child(&entry.name);
            match entry.kind {
                akashica_core::EntryKind::Directory => {
                    if let Some(hash) = hashes.get(&child_path.as_string()) {
                        entry.hash = hash.clone();
                    }
                }
                akashica_core::EntryKind::File => {
                    // Content written in this workspace lives under its
                    // workspace-local key, not yet as a real object — persist
                    // it now so the commit's manifest references real bytes.
                    if let Some(data) = storage.read_workspace_file(workspace_id, &child_path).await? {
                        entry.size = data.len() as u64;
                        entry.hash = storage.write_object(data).await?;
                    }
                }
            }
        }
        let bytes = manifest::serialize(&entries);
        let hash = storage.write_manifest(bytes).await?;
        hashes.insert(dir.as_string(), hash);
    }

    hashes
        .get("")
        .cloned()
        .ok_or_else(|| Error::InvalidManifest("materialize produced no root manifest".into()))
}

pub use workspace::diff as workspace_diff;

/// Diff helper re-exported for callers that only have a `Repository` and
/// not a `Session` handy: arbitrary commit-to-commit.
pub async fn diff_commits<S: StorageAdapter + ?Sized>(
    storage: &S,
    left: &CommitId,
    right: &CommitId,
) -> Result<Vec<PathChange>> {
    tree::diff_commits(storage, left, right).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use akashica_core::{EntryKind, ManifestEntry};

    async fn seed_repo() -> (Repository<LocalStore>, CommitId) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStore::new(dir.path().to_path_buf()));
        let repo = Repository::new(storage.clone());

        let entries = vec![ManifestEntry {
            name: "readme.md".into(),
            hash: storage.write_object(b"hello world".to_vec()).await.unwrap(),
            size: 11,
            kind: EntryKind::File,
        }];
        let bytes = manifest::serialize(&entries);
        let root_hash = storage.write_manifest(bytes).await.unwrap();
        let commit_id = "@root".to_string();
        storage.write_root_manifest(&commit_id, &root_hash).await.unwrap();
        storage
            .write_commit_metadata(
                &commit_id,
                &CommitMetadata {
                    message: "initial".into(),
                    author: "seed".into(),
                    timestamp: Utc::now(),
                    parent: None,
                },
            )
            .await
            .unwrap();
        repo.create_branch("main", &commit_id).await.unwrap();

        (repo, commit_id)
    }

    #[tokio::test]
    async fn publish_advances_branch_and_preserves_content() {
        let (repo, base) = seed_repo().await;
        let ws = repo
            .create_workspace_from_branch("main", "tester")
            .await
            .unwrap();

        let storage = repo.storage();
        workspace::write_file(
            storage,
            &ws,
            &base,
            &akashica_core::RepoPath::parse("new.txt"),
            b"new content".to_vec(),
        )
        .await
        .unwrap();

        let new_commit = repo.publish(&ws, "main", "add new.txt", "tester").await.unwrap();
        assert_eq!(repo.current_head("main").await.unwrap(), new_commit);

        let bytes = tree::read_commit_file(
            storage,
            &new_commit,
            &akashica_core::RepoPath::parse("new.txt"),
        )
        .await
        .unwrap();
        assert_eq!(bytes, b"new content");

        let original = tree::read_commit_file(
            storage,
            &new_commit,
            &akashica_core::RepoPath::parse("readme.md"),
        )
        .await
        .unwrap();
        assert_eq!(original, b"hello world");
    }

    #[tokio::test]
    async fn publish_rejects_stale_workspace() {
        let (repo, _base) = seed_repo().await;
        let ws = repo
            .create_workspace_from_branch("main", "tester")
            .await
            .unwrap();

        // Advance the branch behind the workspace's back.
        let other_ws = repo
            .create_workspace_from_branch("main", "other")
            .await
            .unwrap();
        repo.publish(&other_ws, "main", "first", "other").await.unwrap();

        let err = repo
            .publish(&ws, "main", "second", "tester")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BranchConflict { .. }));
    }

    #[tokio::test]
    async fn reset_refuses_non_ancestor_without_force() {
        let (repo, base) = seed_repo().await;
        let unrelated = format!("@{}", Uuid::new_v4().simple());
        repo.storage()
            .write_commit_metadata(
                &unrelated,
                &CommitMetadata {
                    message: "unrelated".into(),
                    author: "tester".into(),
                    timestamp: Utc::now(),
                    parent: None,
                },
            )
            .await
            .unwrap();

        let err = repo.reset_branch("main", &unrelated, false).await.unwrap_err();
        assert!(matches!(err, Error::NonAncestorReset));

        repo.reset_branch("main", &unrelated, true).await.unwrap();
        assert_eq!(repo.current_head("main").await.unwrap(), unrelated);
        let _ = base;
    }

    #[tokio::test]
    async fn status_reflects_workspace_diff_kind() {
        let (repo, base) = seed_repo().await;
        let ws = repo
            .create_workspace_from_branch("main", "tester")
            .await
            .unwrap();
        workspace::delete_file(
            repo.storage(),
            &ws,
            &base,
            &akashica_core::RepoPath::parse("readme.md"),
        )
        .await
        .unwrap();

        let changes = workspace::status(repo.storage(), &ws, &base).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Deleted);
    }
}
