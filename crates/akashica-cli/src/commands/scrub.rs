use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ScrubAction {
    /// Irrevocably remove a content object's bytes, leaving a tombstone
    Content {
        hash: String,
        #[arg(long)]
        reason: String,
    },
    /// List previously scrubbed content
    List,
}

pub async fn run(action: ScrubAction) -> Result<()> {
    let repo = crate::commands::open_repository().await?;
    let author = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());

    match action {
        ScrubAction::Content { hash, reason } => {
            let tombstone = repo.scrub(&hash, reason, author).await?;
            println!("scrubbed {hash} ({} bytes recovered)", tombstone.original_size);
        }
        ScrubAction::List => {
            for tombstone in repo.list_scrubbed().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    tombstone.deleted_hash,
                    tombstone.timestamp.to_rfc3339(),
                    tombstone.deleted_by,
                    tombstone.reason
                );
            }
        }
    }
    Ok(())
}
