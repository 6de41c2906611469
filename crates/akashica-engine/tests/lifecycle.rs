//! Full publish/reset/scrub lifecycle, run against the
//! in-memory adapter for speed and against a tempfile-backed `LocalStore`
//! for the on-disk contract.

use std::sync::Arc;

use chrono::Utc;

use akashica_core::{CommitMetadata, Error, ManifestEntry, RepoPath};
use akashica_engine::storage::{InMemoryStore, LocalStore, StorageAdapter};
use akashica_engine::{ChangesetRef, Repository, Session};

async fn seed<S: StorageAdapter>(storage: Arc<S>) -> (Repository<S>, String) {
    let repo = Repository::new(storage.clone());

    let entries = vec![ManifestEntry {
        name: "README.md".into(),
        hash: storage.write_object(b"hello".to_vec()).await.unwrap(),
        size: 5,
        kind: akashica_core::EntryKind::File,
    }];
    let bytes = akashica_engine::manifest::serialize(&entries);
    let root_hash = storage.write_manifest(bytes).await.unwrap();
    let commit_id = "@0".to_string();
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

async fn run_full_lifecycle<S: StorageAdapter>(storage: Arc<S>) {
    let (repo, base) = seed(storage).await;

    let ws = repo
        .create_workspace_from_branch("main", "alice")
        .await
        .unwrap();

    {
        let session = Session::new(repo.storage(), ChangesetRef::Workspace(ws.clone()));
        assert!(!session.is_read_only());
        session
            .write_file(&RepoPath::parse("assets/model.bin"), b"binary blob".to_vec())
            .await
            .unwrap();
        let changes = session.status().await.unwrap();
        assert_eq!(changes.len(), 1);
    }

    let commit_one = repo
        .publish(&ws, "main", "add model.bin", "alice")
        .await
        .unwrap();
    assert_eq!(repo.current_head("main").await.unwrap(), commit_one);

    // Read it back through a commit-backed, read-only session.
    let read_session = Session::new(repo.storage(), ChangesetRef::Commit(commit_one.clone()));
    assert!(read_session.is_read_only());
    let bytes = read_session
        .read_file(&RepoPath::parse("assets/model.bin"))
        .await
        .unwrap();
    assert_eq!(bytes, b"binary blob");

    let err = read_session
        .write_file(&RepoPath::parse("assets/model.bin"), b"nope".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SessionReadOnly));

    // Scrub the blob — reads now fail with a tombstone, not a generic error.
    let hash = {
        let manifest = akashica_engine::tree::read_commit_directory(
            repo.storage(),
            &commit_one,
            &RepoPath::parse("assets"),
        )
        .await
        .unwrap();
        manifest
            .iter()
            .find(|e| e.name == "model.bin")
            .unwrap()
            .hash
            .clone()
    };
    repo.scrub(&hash, "legal hold".into(), "alice".into())
        .await
        .unwrap();

    let scrub_err = read_session
        .read_file(&RepoPath::parse("assets/model.bin"))
        .await
        .unwrap_err();
    assert!(matches!(scrub_err, Error::ScrubbedContent { .. }));

    let scrubbed = repo.list_scrubbed().await.unwrap();
    assert_eq!(scrubbed.len(), 1);

    // Reset main back to the seed commit, then forward again.
    repo.reset_branch("main", &base, true).await.unwrap();
    assert_eq!(repo.current_head("main").await.unwrap(), base);
    repo.reset_branch("main", &commit_one, true).await.unwrap();
    assert_eq!(repo.current_head("main").await.unwrap(), commit_one);

    let history = repo.commit_history(&commit_one, 10).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn full_lifecycle_in_memory() {
    run_full_lifecycle(Arc::new(InMemoryStore::new())).await;
}

#[tokio::test]
async fn full_lifecycle_local_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    run_full_lifecycle(Arc::new(LocalStore::new(dir.path().to_path_buf()))).await;
}
