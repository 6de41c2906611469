use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum BranchAction {
    /// List all branches
    List,
    /// Create a branch pointing at a commit (or another branch's head)
    Create { name: String, at: String },
    /// Move a branch to another commit
    Reset {
        name: String,
        target: String,
        /// Allow resetting to a commit that is not a descendant of the current head
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(action: BranchAction) -> Result<()> {
    let repo = crate::commands::open_repository().await?;

    match action {
        BranchAction::List => {
            for name in repo.list_branches().await? {
                let head = repo.current_head(&name).await?;
                println!("{name}\t{head}");
            }
        }
        BranchAction::Create { name, at } => {
            let target = crate::commands::resolve_commit(&repo, &at).await?;
            repo.create_branch(&name, &target).await?;
        }
        BranchAction::Reset { name, target, force } => {
            let target = crate::commands::resolve_commit(&repo, &target).await?;
            repo.reset_branch(&name, &target, force).await?;
        }
    }
    Ok(())
}
