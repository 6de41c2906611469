//! Key layout for the typed storage surface.

use akashica_core::RepoPath;

pub fn object(hash: &str) -> String {
    format!("objects/{hash}")
}

pub fn tombstone(hash: &str) -> String {
    format!("objects/{hash}.tomb")
}

pub fn manifest(hash: &str) -> String {
    format!("manifests/{hash}")
}

pub fn commit_root_manifest(commit_id: &str) -> String {
    format!("commits/{commit_id}/root-manifest")
}

pub fn commit_metadata(commit_id: &str) -> String {
    format!("commits/{commit_id}/metadata.json")
}

pub fn branch(name: &str) -> String {
    format!("branches/{name}")
}

pub fn branches_prefix() -> &'static str {
    "branches"
}

pub fn workspace_metadata(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/metadata.json")
}

pub fn workspace_prefix(workspace_id: &str) -> String {
    format!("workspaces/{workspace_id}/")
}

pub fn workspace_file(workspace_id: &str, path: &RepoPath) -> String {
    format!("workspaces/{workspace_id}/files/{}", path.as_string())
}

pub fn workspace_manifest(workspace_id: &str, path: &RepoPath) -> String {
    format!(
        "workspaces/{workspace_id}/manifests/{}",
        path.as_key_segment()
    )
}

pub fn workspace_cow(workspace_id: &str, path: &RepoPath) -> String {
    format!("workspaces/{workspace_id}/cow/{}", path.as_string())
}
