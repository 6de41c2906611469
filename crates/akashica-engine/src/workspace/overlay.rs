//! Copy-on-write overlay over a workspace's base commit.
//!
//! A workspace never copies the base tree up front. Each directory's
//! overlay manifest is created lazily, the first time something beneath
//! it is written or deleted, seeded from the base commit's listing at
//! that path. From then on the overlay manifest is authoritative for
//! that directory: an entry missing from it means deleted, even if the
//! same name still exists in the base commit.

use akashica_core::{
    ChangeKind, CommitId, ContentHash, CowReference, DirEntry, EntryKind, Error, ManifestEntry,
    RepoPath, Result, WorkspaceId,
};

use crate::hash;
use crate::manifest;
use crate::storage::StorageAdapter;
use crate::tree;

/// Load `dir`'s overlay manifest if one has been created, otherwise seed
/// it from the base commit's listing (or an empty directory if `dir`
/// doesn't exist there either).
async fn load_or_seed<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    dir: &RepoPath,
) -> Result<Vec<ManifestEntry>> {
    match storage.read_workspace_manifest(workspace, dir).await? {
        Some(bytes) => manifest::parse(&bytes),
        None => Ok(tree::try_read_commit_directory(storage, base, dir)
            .await?
            .unwrap_or_default()),
    }
}

/// The effective listing of `dir` right now: the overlay manifest if one
/// exists, otherwise whatever the base commit has there.
pub async fn effective_directory<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    dir: &RepoPath,
) -> Result<Vec<ManifestEntry>> {
    load_or_seed(storage, workspace, base, dir).await
}

/// Rewrite every overlay manifest from `path`'s parent up to the root,
/// folding in `leaf_update` (the new entry for `path`, or `None` to
/// remove it) at the bottom and propagating the resulting hash/size
/// upward as each enclosing directory's own entry.
async fn propagate<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    path: &RepoPath,
    leaf_update: Option<ManifestEntry>,
) -> Result<()> {
    let mut dir = path.parent();
    let mut name = path
        .leaf()
        .expect("write/delete path must not be the repository root")
        .to_string();
    let mut pending = leaf_update;

    loop {
        let mut entries = load_or_seed(storage, workspace, base, &dir).await?;
        entries.retain(|e| e.name != name);
        if let Some(entry) = pending.take() {
            entries.push(entry);
        }

        let bytes = manifest::serialize(&entries);
        storage
            .write_workspace_manifest(workspace, &dir, bytes.clone())
            .await?;

        if dir.is_root() {
            return Ok(());
        }

        name = dir
            .leaf()
            .expect("non-root directory has a leaf name")
            .to_string();
        pending = Some(ManifestEntry {
            name: name.clone(),
            hash: hash::sha256_hex(&bytes),
            size: bytes.len() as u64,
            kind: EntryKind::Directory,
        });
        dir = dir.parent();
    }
}

/// Read `path` through the workspace's four-step precedence:
/// deleted-in-overlay, workspace file, COW reference, base commit.
pub async fn read_file<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    path: &RepoPath,
) -> Result<Vec<u8>> {
    let name = path
        .leaf()
        .ok_or_else(|| Error::FileNotFound(path.as_string()))?;

    if let Some(bytes) = storage.read_workspace_manifest(workspace, &path.parent()).await? {
        let entries = manifest::parse(&bytes)?;
        if !entries.iter().any(|e| e.name == name) {
            return Err(Error::FileNotFound(path.as_string()));
        }
    }

    if let Some(data) = storage.read_workspace_file(workspace, path).await? {
        return Ok(data);
    }

    if let Some(cow) = storage.read_workspace_cow(workspace, path).await? {
        return storage.read_object(&cow.hash).await;
    }

    tree::read_commit_file(storage, base, path).await
}

pub async fn file_exists<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    path: &RepoPath,
) -> Result<bool> {
    match read_file(storage, workspace, base, path).await {
        Ok(_) => Ok(true),
        Err(Error::FileNotFound(_)) => Ok(false),
        Err(other) => Err(other),
    }
}

/// Directory listing under workspace semantics: overlay manifest if
/// present, base commit listing otherwise.
pub async fn list_directory<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    dir: &RepoPath,
) -> Result<Vec<DirEntry>> {
    let mut entries = effective_directory(storage, workspace, base, dir).await?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries
        .into_iter()
        .map(|e| DirEntry {
            name: e.name,
            kind: e.kind,
            hash: e.hash,
            size: e.size,
        })
        .collect())
}

/// Write `data` at `path`, storing the bytes in the workspace and
/// propagating the new entry up through every enclosing overlay manifest.
pub async fn write_file<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    path: &RepoPath,
    data: Vec<u8>,
) -> Result<()> {
    if path.is_root() {
        return Err(Error::InvalidManifest(
            "cannot write to the repository root as a file".into(),
        ));
    }
    let size = data.len() as u64;
    let hash = hash::sha256_hex(&data);
    storage.write_workspace_file(workspace, path, data).await?;
    storage.delete_workspace_cow(workspace, path).await.ok();

    let entry = ManifestEntry {
        name: path.leaf().unwrap().to_string(),
        hash,
        size,
        kind: EntryKind::File,
    };
    propagate(storage, workspace, base, path, Some(entry)).await
}

/// Delete `path`. Idempotent — deleting a path that doesn't currently
/// resolve is a no-op rather than an error (mirrors the underlying
/// key-value delete's idempotence).
pub async fn delete_file<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    path: &RepoPath,
) -> Result<()> {
    if path.is_root() {
        return Err(Error::InvalidManifest(
            "cannot delete the repository root".into(),
        ));
    }
    storage.delete_workspace_file(workspace, path).await?;
    storage.delete_workspace_cow(workspace, path).await?;
    propagate(storage, workspace, base, path, None).await
}

/// Move `from` to `to`. The destination borrows the source's content by
/// reference rather than copying bytes, resolved against whatever `from`
/// currently points to — a workspace file, an existing COW reference, or
/// the base commit.
pub async fn move_file<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    from: &RepoPath,
    to: &RepoPath,
) -> Result<()> {
    if from.is_root() || to.is_root() {
        return Err(Error::InvalidManifest(
            "cannot move the repository root".into(),
        ));
    }
    let (hash, size) = resolve_content(storage, workspace, base, from).await?;

    delete_file(storage, workspace, base, from).await?;

    let cow = CowReference {
        base_path: from.as_string(),
        hash: hash.clone(),
        size,
    };
    storage.write_workspace_cow(workspace, to, &cow).await?;

    let entry = ManifestEntry {
        name: to.leaf().unwrap().to_string(),
        hash,
        size,
        kind: EntryKind::File,
    };
    propagate(storage, workspace, base, to, Some(entry)).await
}

/// Resolve `path`'s current `(hash, size)` without materializing bytes,
/// following the same precedence as [`read_file`].
async fn resolve_content<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    path: &RepoPath,
) -> Result<(ContentHash, u64)> {
    let name = path
        .leaf()
        .ok_or_else(|| Error::FileNotFound(path.as_string()))?;
    let parent_entries = effective_directory(storage, workspace, base, &path.parent()).await?;
    let entry = parent_entries
        .into_iter()
        .find(|e| e.name == name && e.kind == EntryKind::File)
        .ok_or_else(|| Error::FileNotFound(path.as_string()))?;
    Ok((entry.hash, entry.size))
}

/// Recursive workspace-vs-commit comparison. Walks every directory
/// reachable from either side, so a directory's overlay
/// manifest being absent (nothing changed under it) correctly yields no
/// changes when comparing against its own base.
pub async fn diff<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
    against: &CommitId,
) -> Result<Vec<akashica_core::PathChange>> {
    use std::collections::{HashMap, VecDeque};

    let mut out = Vec::new();
    let mut queue: VecDeque<RepoPath> = VecDeque::new();
    queue.push_back(RepoPath::root());

    while let Some(dir) = queue.pop_front() {
        let left = effective_directory(storage, workspace, base, &dir).await?;
        let right = tree::try_read_commit_directory(storage, against, &dir)
            .await?
            .unwrap_or_default();

        let left_by_name: HashMap<&str, &ManifestEntry> =
            left.iter().map(|e| (e.name.as_str(), e)).collect();
        let right_by_name: HashMap<&str, &ManifestEntry> =
            right.iter().map(|e| (e.name.as_str(), e)).collect();

        for l in &left {
            let child = dir.child(&l.name);
            match right_by_name.get(l.name.as_str()) {
                None => match l.kind {
                    EntryKind::File => out.push(akashica_core::PathChange {
                        path: child.as_string(),
                        kind: ChangeKind::Added,
                    }),
                    EntryKind::Directory => queue.push_back(child),
                },
                Some(r) => match (l.kind, r.kind) {
                    (EntryKind::File, EntryKind::File) => {
                        if l.hash != r.hash {
                            out.push(akashica_core::PathChange {
                                path: child.as_string(),
                                kind: ChangeKind::Modified,
                            });
                        }
                    }
                    _ => queue.push_back(child),
                },
            }
        }

        for r in &right {
            if left_by_name.contains_key(r.name.as_str()) {
                continue;
            }
            let child = dir.child(&r.name);
            match r.kind {
                EntryKind::File => out.push(akashica_core::PathChange {
                    path: child.as_string(),
                    kind: ChangeKind::Deleted,
                }),
                EntryKind::Directory => queue.push_back(child),
            }
        }
    }

    Ok(out)
}

/// Changes in the workspace relative to its own base commit.
pub async fn status<S: StorageAdapter + ?Sized>(
    storage: &S,
    workspace: &WorkspaceId,
    base: &CommitId,
) -> Result<Vec<akashica_core::PathChange>> {
    diff(storage, workspace, base, base).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use akashica_core::ChangeKind;

    async fn seed_base(storage: &LocalStore) -> CommitId {
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
    async fn read_falls_back_to_base_when_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();

        let data = read_file(&storage, &ws, &base, &RepoPath::parse("a.txt"))
            .await
            .unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn write_then_read_sees_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();
        let path = RepoPath::parse("a.txt");

        write_file(&storage, &ws, &base, &path, b"goodbye".to_vec())
            .await
            .unwrap();
        let data = read_file(&storage, &ws, &base, &path).await.unwrap();
        assert_eq!(data, b"goodbye");
    }

    #[tokio::test]
    async fn nested_write_seeds_and_propagates_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();
        let path = RepoPath::parse("dir/sub/new.txt");

        write_file(&storage, &ws, &base, &path, b"nested".to_vec())
            .await
            .unwrap();

        let data = read_file(&storage, &ws, &base, &path).await.unwrap();
        assert_eq!(data, b"nested");

        let root_manifest = storage
            .read_workspace_manifest(&ws, &RepoPath::root())
            .await
            .unwrap()
            .unwrap();
        let root_entries = manifest::parse(&root_manifest).unwrap();
        assert!(root_entries.iter().any(|e| e.name == "dir"));
        assert!(root_entries.iter().any(|e| e.name == "a.txt"));
    }

    #[tokio::test]
    async fn delete_removes_entry_from_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();
        let path = RepoPath::parse("a.txt");

        delete_file(&storage, &ws, &base, &path).await.unwrap();
        let err = read_file(&storage, &ws, &base, &path).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[tokio::test]
    async fn move_creates_cow_reference_at_destination() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();
        let from = RepoPath::parse("a.txt");
        let to = RepoPath::parse("moved/a.txt");

        move_file(&storage, &ws, &base, &from, &to).await.unwrap();

        assert!(!file_exists(&storage, &ws, &base, &from).await.unwrap());
        let data = read_file(&storage, &ws, &base, &to).await.unwrap();
        assert_eq!(data, b"hello");

        let cow = storage.read_workspace_cow(&ws, &to).await.unwrap();
        assert!(cow.is_some());
    }

    #[tokio::test]
    async fn status_reports_added_modified_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();

        write_file(
            &storage,
            &ws,
            &base,
            &RepoPath::parse("a.txt"),
            b"changed".to_vec(),
        )
        .await
        .unwrap();
        write_file(
            &storage,
            &ws,
            &base,
            &RepoPath::parse("b.txt"),
            b"brand new".to_vec(),
        )
        .await
        .unwrap();

        let changes = status(&storage, &ws, &base).await.unwrap();
        let kinds: std::collections::HashMap<_, _> =
            changes.into_iter().map(|c| (c.path, c.kind)).collect();
        assert_eq!(kinds.get("a.txt"), Some(&ChangeKind::Modified));
        assert_eq!(kinds.get("b.txt"), Some(&ChangeKind::Added));
    }

    #[tokio::test]
    async fn status_is_empty_for_untouched_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        let base = seed_base(&storage).await;
        let ws = "@1$w1".to_string();

        let changes = status(&storage, &ws, &base).await.unwrap();
        assert!(changes.is_empty());
    }
}
