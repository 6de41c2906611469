mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
    BranchPointer, ChangeKind, CommitId, CommitMetadata, ContentHash, CowReference, DirEntry,
    EntryKind, ManifestEntry, PathChange, RepoPath, Tombstone, WorkspaceId, WorkspaceMetadata,
};
