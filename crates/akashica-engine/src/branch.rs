//! Branch layer: named, mutable pointers at a commit,
//! updated under compare-and-swap.

use akashica_core::{CommitId, Error, Result};

use crate::commit;
use crate::storage::StorageAdapter;

pub async fn list<S: StorageAdapter + ?Sized>(storage: &S) -> Result<Vec<String>> {
    storage.list_branches().await
}

pub async fn head<S: StorageAdapter + ?Sized>(storage: &S, name: &str) -> Result<CommitId> {
    Ok(storage.read_branch(name).await?.head)
}

/// Create a new branch pointing at `commit`. Fails with
/// `BranchConflict` if the name is already taken.
pub async fn create<S: StorageAdapter + ?Sized>(
    storage: &S,
    name: &str,
    commit: &CommitId,
) -> Result<()> {
    storage.update_branch(name, None, commit).await
}

/// Advance `name` from `expected` to `new` (the publish-time fast-forward
/// case). `expected` must be the branch's current head.
pub async fn advance<S: StorageAdapter + ?Sized>(
    storage: &S,
    name: &str,
    expected: &CommitId,
    new: &CommitId,
) -> Result<()> {
    storage.update_branch(name, Some(expected), new).await
}

/// Reset `name` to `target`. Refuses to move a branch to a commit that
/// is not a descendant of its current head unless `force` is set.
pub async fn reset<S: StorageAdapter + ?Sized>(
    storage: &S,
    name: &str,
    target: &CommitId,
    force: bool,
) -> Result<()> {
    let current = head(storage, name).await?;
    if !force && !commit::is_ancestor(storage, target, &current).await? {
        return Err(Error::NonAncestorReset);
    }
    storage.update_branch(name, Some(&current), target).await
}
