//! workflow-status binary: quick repository summary
//!
//! Read-only counterpart of workflow-merge. Shows the current branch, the
//! working-tree dirty flag, and the open-PR count, with the expensive parts
//! served from the file cache when fresh.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use workflow_merge::cache::StatusCache;
use workflow_merge::cli::context::CommandContext;
use workflow_merge::cli::style::{Stylize, check, warn_sign};
use workflow_merge::error::Error;
use workflow_merge::status;

/// Show a cached summary of the repository and its open PRs
#[derive(Parser, Debug)]
#[command(name = "workflow-status", version, about, long_about = None)]
struct Cli {
    /// Ignore the cache and recompute everything
    #[arg(long)]
    refresh: bool,

    /// Show detailed output, including git commands
    #[arg(short, long)]
    verbose: bool,

    /// Path to the repository (defaults to the current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Remote to use (defaults to origin)
    #[arg(long)]
    remote: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::eprintln!("{} {e}", "error:".warn());
            if let Some(hint) = e.hint() {
                anstream::eprintln!("{}", hint.muted());
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let ctx = CommandContext::new(&cli.path, cli.remote.as_deref(), cli.verbose)?;

    let mut cache = StatusCache::new()?;
    if cli.refresh {
        cache = cache.with_ttl(Duration::ZERO);
    }

    let repo_status = status::gather(ctx.vcs.as_ref(), ctx.tracker.as_ref(), &cache).await?;

    let config = ctx.tracker.config();
    anstream::println!(
        "{}",
        format!("{}/{}", config.owner, config.repo).emphasis()
    );
    anstream::println!("  branch: {}", repo_status.branch.accent());
    if repo_status.dirty {
        anstream::println!("  {} working tree has uncommitted changes", warn_sign());
    } else {
        anstream::println!("  {} working tree clean", check());
    }
    anstream::println!(
        "  open PRs: {}{}",
        repo_status.open_pr_count.accent(),
        if repo_status.from_cache {
            " (cached)".muted()
        } else {
            String::new()
        }
    );
    Ok(())
}
