pub mod branch;
pub mod diff;
pub mod fileops;
pub mod init;
pub mod log;
pub mod scrub;
pub mod workspace;

use std::sync::Arc;

use akashica_core::CommitId;
use akashica_engine::storage::StorageAdapter;
use akashica_engine::Repository;
use anyhow::{Context, Result};

use crate::config::{Config, StorageConfig};

/// Build the repository façade from the resolved configuration.
pub async fn open_repository() -> Result<Repository<dyn StorageAdapter>> {
    let config = Config::load()?;
    let storage: Arc<dyn StorageAdapter> = match config.storage {
        StorageConfig::Local { path } => {
            Arc::new(akashica_engine::storage::LocalStore::new(path))
        }
        #[cfg(feature = "s3")]
        StorageConfig::S3 { .. } => {
            anyhow::bail!("s3 storage backend is not wired up from the CLI yet")
        }
    };
    Ok(Repository::new(storage))
}

/// Resolve a CLI-supplied ref to a commit id: `@<id>` is used verbatim,
/// anything else is looked up as a branch name.
pub async fn resolve_commit(
    repo: &Repository<dyn StorageAdapter>,
    reference: &str,
) -> Result<CommitId> {
    if reference.starts_with('@') && !reference.contains('$') {
        Ok(reference.to_string())
    } else {
        repo.current_head(reference)
            .await
            .with_context(|| format!("no such branch: {reference}"))
    }
}
