use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowercase-hex SHA-256 digest, 64 characters, no prefix.
pub type ContentHash = String;

/// Opaque commit identifier, conventionally `@N`. Never parsed as an
/// integer; callers treat it as an opaque string.
pub type CommitId = String;

/// Opaque workspace identifier of the form `@<baseCommit>$<suffix>`.
pub type WorkspaceId = String;

/// A repository path: an ordered sequence of non-empty components.
/// `.` and `..` are not special here — callers normalize before
/// calling into the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RepoPath {
    components: Vec<String>,
}

impl RepoPath {
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub fn parse(path: &str) -> Self {
        let components = path
            .split('/')
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Self { components }
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn leaf(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// The enclosing directory path.
    pub fn parent(&self) -> Self {
        let mut components = self.components.clone();
        components.pop();
        Self { components }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut components = self.components.clone();
        components.push(name.to_string());
        Self { components }
    }

    pub fn as_string(&self) -> String {
        self.components.join("/")
    }

    /// Storage-key-safe rendering of the root path: the `__root__`
    /// sentinel, since an empty string is not a usable key segment.
    pub fn as_key_segment(&self) -> String {
        if self.is_root() {
            "__root__".to_string()
        } else {
            self.as_string()
        }
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

/// Kind of a manifest entry: a file (content object) or a nested directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single entry in a directory manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub hash: ContentHash,
    pub size: u64,
    pub kind: EntryKind,
}

/// Commit metadata, JSON-serialized at `commits/<id>/metadata.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub parent: Option<CommitId>,
}

/// A branch pointer: `{"head": "<commitId>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchPointer {
    pub head: CommitId,
}

/// Workspace metadata, `{base, created, creator}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceMetadata {
    pub base: CommitId,
    pub created: DateTime<Utc>,
    pub creator: String,
}

/// A copy-on-write reference: borrows content from an existing hash
/// without copying bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CowReference {
    pub base_path: String,
    pub hash: ContentHash,
    pub size: u64,
}

/// An audit record that replaces a scrubbed content object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tombstone {
    pub deleted_hash: ContentHash,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub deleted_by: String,
    pub original_size: u64,
}

/// One path's worth of change, as produced by `status()`/`diff()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathChange {
    pub path: String,
    pub kind: ChangeKind,
}

/// A listing entry as returned by `listDirectory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    pub hash: ContentHash,
    pub size: u64,
}
