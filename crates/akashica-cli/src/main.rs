mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::branch::BranchAction;
use commands::fileops::FileAction;
use commands::scrub::ScrubAction;
use commands::workspace::WorkspaceAction;

#[derive(Parser)]
#[command(name = "ak", about = "Akashica — content-addressed storage for large binary assets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new repository
    Init {
        /// Directory to initialize (defaults to `.akashica`)
        path: Option<std::path::PathBuf>,
    },

    /// Create, publish, delete, or inspect a workspace
    Workspace {
        #[command(subcommand)]
        action: WorkspaceAction,
    },

    /// Read, list, write, delete, or move files
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// List, create, or reset branches
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Show commit history, most recent first
    Log {
        /// Branch name or `@commit` id
        #[arg(default_value = "main")]
        reference: String,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Compare two commits
    Diff { left: String, right: String },

    /// Scrub content objects (legal/compliance removal) or list tombstones
    Scrub {
        #[command(subcommand)]
        action: ScrubAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => commands::init::run(path).await,
        Commands::Workspace { action } => commands::workspace::run(action).await,
        Commands::File { action } => commands::fileops::run(action).await,
        Commands::Branch { action } => commands::branch::run(action).await,
        Commands::Log { reference, limit } => commands::log::run(reference, limit).await,
        Commands::Diff { left, right } => commands::diff::run(left, right).await,
        Commands::Scrub { action } => commands::scrub::run(action).await,
    }
}
