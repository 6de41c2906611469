use anyhow::Result;

pub async fn run(reference: String, limit: Option<usize>) -> Result<()> {
    let repo = crate::commands::open_repository().await?;
    let head = crate::commands::resolve_commit(&repo, &reference).await?;

    let history = repo.commit_history(&head, limit.unwrap_or(usize::MAX)).await?;
    for (id, meta) in history {
        println!(
            "{id}\t{}\t{}\t{}",
            meta.timestamp.to_rfc3339(),
            meta.author,
            meta.message
        );
    }
    Ok(())
}
