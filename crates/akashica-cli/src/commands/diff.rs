use anyhow::Result;

/// Compare two commits: diff generalized to an arbitrary pair, not just
/// a workspace against its own base.
pub async fn run(left: String, right: String) -> Result<()> {
    let repo = crate::commands::open_repository().await?;
    let left = crate::commands::resolve_commit(&repo, &left).await?;
    let right = crate::commands::resolve_commit(&repo, &right).await?;

    let changes = akashica_engine::repo::diff_commits(repo.storage(), &left, &right).await?;
    for change in changes {
        println!("{:?}\t{}", change.kind, change.path);
    }
    Ok(())
}
