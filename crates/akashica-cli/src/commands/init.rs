use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use akashica_core::CommitMetadata;
use akashica_engine::manifest;

use crate::config::{Config, StorageConfig};

/// Initialize a new repository: an empty root commit and a `main`
/// branch pointing at it.
pub async fn run(path: Option<PathBuf>) -> Result<()> {
    let storage_path = path.unwrap_or_else(|| PathBuf::from(".akashica"));
    std::fs::create_dir_all(&storage_path)
        .with_context(|| format!("creating {}", storage_path.display()))?;

    let config = Config {
        storage: StorageConfig::Local {
            path: storage_path.clone(),
        },
    };
    config.save()?;

    let repo = crate::commands::open_repository().await?;
    let storage = repo.storage();

    let root_bytes = manifest::serialize(&[]);
    let root_hash = storage.write_manifest(root_bytes).await?;
    let commit_id = "@0".to_string();
    storage.write_root_manifest(&commit_id, &root_hash).await?;
    storage
        .write_commit_metadata(
            &commit_id,
            &CommitMetadata {
                message: "initial commit".into(),
                author: whoami_author(),
                timestamp: Utc::now(),
                parent: None,
            },
        )
        .await?;
    repo.create_branch("main", &commit_id).await?;

    info!(path = %storage_path.display(), "initialized akashica repository");
    println!("Initialized empty Akashica repository in {}", storage_path.display());
    Ok(())
}

fn whoami_author() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}
