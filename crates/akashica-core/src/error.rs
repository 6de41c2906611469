use thiserror::Error;

use crate::types::Tombstone;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("commit not found: {0}")]
    CommitNotFound(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("workspace not found: {0}")]
    WorkspaceNotFound(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("session is read-only (backed by a commit, not a workspace)")]
    SessionReadOnly,

    #[error("branch conflict: expected {expected:?}, found {actual:?}")]
    BranchConflict {
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("reset target is not an ancestor of the current head (use force to override)")]
    NonAncestorReset,

    #[error("content has been scrubbed: {}", .tombstone.deleted_hash)]
    ScrubbedContent { tombstone: Tombstone },

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
