//! Read-side tree traversal over a commit's root manifest. Shared by
//! commit-backed session reads and by the workspace overlay's
//! base-commit fallback.

use akashica_core::{
    ChangeKind, CommitId, ContentHash, EntryKind, Error, ManifestEntry, PathChange, RepoPath,
    Result,
};

use crate::manifest;
use crate::storage::StorageAdapter;

/// Resolve the manifest hash at `path` within `commit`, walking down from
/// the root manifest one directory component at a time.
async fn resolve_directory_hash<S: StorageAdapter + ?Sized>(
    storage: &S,
    commit: &CommitId,
    path: &RepoPath,
) -> Result<Option<ContentHash>> {
    let mut current = storage.read_root_manifest(commit).await?;
    for component in path.components() {
        let bytes = storage.read_manifest(&current).await?;
        let entries = manifest::parse(&bytes)?;
        let Some(entry) = entries
            .into_iter()
            .find(|e| &e.name == component && e.kind == EntryKind::Directory)
        else {
            return Ok(None);
        };
        current = entry.hash;
    }
    Ok(Some(current))
}

/// Directory listing at `path` in `commit`. Errs with `FileNotFound` if
/// no such directory exists.
pub async fn read_commit_directory<S: StorageAdapter + ?Sized>(
    storage: &S,
    commit: &CommitId,
    path: &RepoPath,
) -> Result<Vec<ManifestEntry>> {
    try_read_commit_directory(storage, commit, path)
        .await?
        .ok_or_else(|| Error::FileNotFound(path.as_string()))
}

/// Like [`read_commit_directory`], but returns `None` instead of erroring
/// when the directory does not exist — used by the workspace overlay's
/// "seed from base, or start empty" rule.
pub async fn try_read_commit_directory<S: StorageAdapter + ?Sized>(
    storage: &S,
    commit: &CommitId,
    path: &RepoPath,
) -> Result<Option<Vec<ManifestEntry>>> {
    let Some(hash) = resolve_directory_hash(storage, commit, path).await? else {
        return Ok(None);
    };
    let bytes = storage.read_manifest(&hash).await?;
    Ok(Some(manifest::parse(&bytes)?))
}

/// The manifest entry for `path` itself (looked up within its parent
/// directory), or `None` if absent.
pub async fn entry_at<S: StorageAdapter + ?Sized>(
    storage: &S,
    commit: &CommitId,
    path: &RepoPath,
) -> Result<Option<ManifestEntry>> {
    let Some(name) = path.leaf() else {
        return Ok(None);
    };
    let Some(entries) = try_read_commit_directory(storage, commit, &path.parent()).await? else {
        return Ok(None);
    };
    Ok(entries.into_iter().find(|e| e.name == name))
}

/// Read a file's bytes out of `commit`'s tree.
pub async fn read_commit_file<S: StorageAdapter + ?Sized>(
    storage: &S,
    commit: &CommitId,
    path: &RepoPath,
) -> Result<Vec<u8>> {
    let entry = entry_at(storage, commit, path)
        .await?
        .filter(|e| e.kind == EntryKind::File)
        .ok_or_else(|| Error::FileNotFound(path.as_string()))?;
    storage.read_object(&entry.hash).await
}

/// Diff two committed trees directly, with no overlay involved — used
/// when a [`crate::session::Session`] over a commit compares itself
/// against another commit.
pub async fn diff_commits<S: StorageAdapter + ?Sized>(
    storage: &S,
    left: &CommitId,
    right: &CommitId,
) -> Result<Vec<PathChange>> {
    use std::collections::{HashMap, VecDeque};

    let mut out = Vec::new();
    let mut queue: VecDeque<RepoPath> = VecDeque::new();
    queue.push_back(RepoPath::root());

    while let Some(dir) = queue.pop_front() {
        let left_entries = try_read_commit_directory(storage, left, &dir)
            .await?
            .unwrap_or_default();
        let right_entries = try_read_commit_directory(storage, right, &dir)
            .await?
            .unwrap_or_default();

        let left_by_name: HashMap<&str, &ManifestEntry> =
            left_entries.iter().map(|e| (e.name.as_str(), e)).collect();
        let right_by_name: HashMap<&str, &ManifestEntry> = right_entries
            .iter()
            .map(|e| (e.name.as_str(), e))
            .collect();

        for l in &left_entries {
            let child = dir.child(&l.name);
            match right_by_name.get(l.name.as_str()) {
                None => match l.kind {
                    EntryKind::File => out.push(PathChange {
                        path: child.as_string(),
                        kind: ChangeKind::Added,
                    }),
                    EntryKind::Directory => queue.push_back(child),
                },
                Some(r) => match (l.kind, r.kind) {
                    (EntryKind::File, EntryKind::File) => {
                        if l.hash != r.hash {
                            out.push(PathChange {
                                path: child.as_string(),
                                kind: ChangeKind::Modified,
                            });
                        }
                    }
                    _ => queue.push_back(child),
                },
            }
        }

        for r in &right_entries {
            if left_by_name.contains_key(r.name.as_str()) {
                continue;
            }
            let child = dir.child(&r.name);
            match r.kind {
                EntryKind::File => out.push(PathChange {
                    path: child.as_string(),
                    kind: ChangeKind::Deleted,
                }),
                EntryKind::Directory => queue.push_back(child),
            }
        }
    }

    Ok(out)
}
