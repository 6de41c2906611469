//! Commit layer: ancestry walks over the single-parent chain. History
//! is a straight line in this engine — merges are out of scope.

use akashica_core::{CommitId, CommitMetadata, Error, Result};

use crate::storage::StorageAdapter;

/// Defensive bound on parent-chain walks so a corrupted or cyclic chain
/// (which should never occur in practice) fails loudly instead of
/// looping forever.
const MAX_HISTORY_DEPTH: usize = 1_000_000;

/// `A` is an ancestor of `B` iff `A == B`, or `A` is an ancestor of
/// `parent(B)`.
pub async fn is_ancestor<S: StorageAdapter + ?Sized>(
    storage: &S,
    ancestor: &CommitId,
    descendant: &CommitId,
) -> Result<bool> {
    let mut current = descendant.clone();
    for _ in 0..MAX_HISTORY_DEPTH {
        if &current == ancestor {
            return Ok(true);
        }
        let meta = storage.read_commit_metadata(&current).await?;
        match meta.parent {
            Some(parent) => current = parent,
            None => return Ok(false),
        }
    }
    Err(Error::InvalidManifest(format!(
        "commit history chain from {descendant} exceeded {MAX_HISTORY_DEPTH} entries"
    )))
}

/// All commits reachable by walking `parent` from `to` back to (and
/// including) `from`, in descendant-to-ancestor order. Returns an empty
/// vec if `from` is not actually an ancestor of `to`.
pub async fn commits_between<S: StorageAdapter + ?Sized>(
    storage: &S,
    from: &CommitId,
    to: &CommitId,
) -> Result<Vec<CommitId>> {
    let mut chain = Vec::new();
    let mut current = to.clone();
    loop {
        chain.push(current.clone());
        if &current == from {
            return Ok(chain);
        }
        let meta = storage.read_commit_metadata(&current).await?;
        match meta.parent {
            Some(parent) => current = parent,
            None => return Ok(Vec::new()),
        }
        if chain.len() > MAX_HISTORY_DEPTH {
            return Err(Error::InvalidManifest(format!(
                "commit history chain from {to} exceeded {MAX_HISTORY_DEPTH} entries"
            )));
        }
    }
}

/// Bounded walk of commit metadata starting at `head`, most recent first.
pub async fn history<S: StorageAdapter + ?Sized>(
    storage: &S,
    head: &CommitId,
    limit: usize,
) -> Result<Vec<(CommitId, CommitMetadata)>> {
    let mut out = Vec::new();
    let mut current = Some(head.clone());
    while let Some(id) = current {
        if out.len() >= limit {
            break;
        }
        let meta = storage.read_commit_metadata(&id).await?;
        current = meta.parent.clone();
        out.push((id, meta));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use akashica_core::CommitMetadata;
    use chrono::Utc;

    async fn seed_chain(storage: &LocalStore, ids: &[&str]) {
        let mut parent: Option<String> = None;
        for id in ids {
            let meta = CommitMetadata {
                message: format!("commit {id}"),
                author: "test".into(),
                timestamp: Utc::now(),
                parent: parent.clone(),
            };
            storage
                .write_commit_metadata(&id.to_string(), &meta)
                .await
                .unwrap();
            parent = Some(id.to_string());
        }
    }

    #[tokio::test]
    async fn ancestry_walk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        seed_chain(&storage, &["@1", "@2", "@3"]).await;

        assert!(is_ancestor(&storage, &"@1".to_string(), &"@3".to_string())
            .await
            .unwrap());
        assert!(is_ancestor(&storage, &"@3".to_string(), &"@3".to_string())
            .await
            .unwrap());

        let meta = CommitMetadata {
            message: "unrelated".into(),
            author: "test".into(),
            timestamp: Utc::now(),
            parent: None,
        };
        storage
            .write_commit_metadata(&"@99".to_string(), &meta)
            .await
            .unwrap();
        assert!(
            !is_ancestor(&storage, &"@99".to_string(), &"@3".to_string())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn history_walk_respects_limit() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().to_path_buf());
        seed_chain(&storage, &["@1", "@2", "@3"]).await;

        let h = history(&storage, &"@3".to_string(), 2).await.unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].0, "@3");
        assert_eq!(h[1].0, "@2");
    }
}
