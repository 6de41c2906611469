use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use akashica_core::RepoPath;
use akashica_engine::{ChangesetRef, Session};

#[derive(Subcommand)]
pub enum FileAction {
    /// Print a file's contents to stdout
    Read { changeset: String, path: String },
    /// List a directory's entries
    Ls {
        changeset: String,
        #[arg(default_value = "")]
        path: String,
    },
    /// Write a local file's contents into a workspace
    Write {
        workspace: String,
        path: String,
        /// Local file to read from (defaults to stdin)
        #[arg(long)]
        from: Option<PathBuf>,
    },
    /// Delete a path from a workspace
    Rm { workspace: String, path: String },
    /// Move a path within a workspace
    Mv {
        workspace: String,
        from: String,
        to: String,
    },
}

/// `@<id>` is a commit; anything containing `$` is a workspace id.
fn parse_changeset(reference: &str) -> ChangesetRef {
    if reference.contains('$') {
        ChangesetRef::Workspace(reference.to_string())
    } else {
        ChangesetRef::Commit(reference.to_string())
    }
}

pub async fn run(action: FileAction) -> Result<()> {
    let repo = crate::commands::open_repository().await?;
    let storage = repo.storage();

    match action {
        FileAction::Read { changeset, path } => {
            let session = Session::new(storage, parse_changeset(&changeset));
            let data = session.read_file(&RepoPath::parse(&path)).await?;
            std::io::stdout().write_all(&data)?;
        }
        FileAction::Ls { changeset, path } => {
            let session = Session::new(storage, parse_changeset(&changeset));
            let entries = session.list_directory(&RepoPath::parse(&path)).await?;
            for entry in entries {
                let suffix = match entry.kind {
                    akashica_core::EntryKind::Directory => "/",
                    akashica_core::EntryKind::File => "",
                };
                println!("{}{suffix}\t{}\t{}", entry.name, entry.size, entry.hash);
            }
        }
        FileAction::Write { workspace, path, from } => {
            let data = match from {
                Some(file) => std::fs::read(&file)
                    .with_context(|| format!("reading {}", file.display()))?,
                None => {
                    let mut buf = Vec::new();
                    std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)?;
                    buf
                }
            };
            let session = Session::new(storage, ChangesetRef::Workspace(workspace));
            session.write_file(&RepoPath::parse(&path), data).await?;
        }
        FileAction::Rm { workspace, path } => {
            let session = Session::new(storage, ChangesetRef::Workspace(workspace));
            session.delete_file(&RepoPath::parse(&path)).await?;
        }
        FileAction::Mv { workspace, from, to } => {
            let session = Session::new(storage, ChangesetRef::Workspace(workspace));
            session
                .move_file(&RepoPath::parse(&from), &RepoPath::parse(&to))
                .await?;
        }
    }
    Ok(())
}
