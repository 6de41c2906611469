use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum WorkspaceAction {
    /// Create a workspace over a branch's current head
    Create {
        /// Branch to base the workspace on
        #[arg(long, default_value = "main")]
        branch: String,
    },
    /// Materialize a workspace into a new commit and advance its branch
    Publish {
        workspace: String,
        #[arg(long, default_value = "main")]
        branch: String,
        #[arg(short, long)]
        message: String,
    },
    /// Discard a workspace without publishing it
    Delete { workspace: String },
    /// Show added/modified/deleted paths relative to the workspace's base
    Status { workspace: String },
}

pub async fn run(action: WorkspaceAction) -> Result<()> {
    let repo = crate::commands::open_repository().await?;
    let author = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());

    match action {
        WorkspaceAction::Create { branch } => {
            let ws = repo.create_workspace_from_branch(&branch, &author).await?;
            println!("{ws}");
        }
        WorkspaceAction::Publish {
            workspace,
            branch,
            message,
        } => {
            let commit = repo.publish(&workspace, &branch, &message, &author).await?;
            println!("{commit}");
        }
        WorkspaceAction::Delete { workspace } => {
            repo.delete_workspace(&workspace).await?;
        }
        WorkspaceAction::Status { workspace } => {
            let ws_meta = repo.storage().read_workspace_metadata(&workspace).await?;
            let changes =
                akashica_engine::workspace::status(repo.storage(), &workspace, &ws_meta.base)
                    .await?;
            for change in changes {
                println!("{:?}\t{}", change.kind, change.path);
            }
        }
    }
    Ok(())
}
