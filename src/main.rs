//! workflow-merge binary entry point

use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;
use workflow_merge::cli::merge::{MergeOptions, run_merge};
use workflow_merge::cli::style::Stylize;
use workflow_merge::error::Error;
use workflow_merge::types::MergeMethod;

/// Merge a pull request and clean up its worktree and remote branch
#[derive(Parser, Debug)]
#[command(name = "workflow-merge", version, long_about = None)]
struct Cli {
    /// PR number to merge (inferred from the current branch when omitted)
    pr_number: Option<String>,

    /// Show what would happen without mutating anything
    #[arg(long)]
    dry_run: bool,

    /// Proceed despite validation failures (reported as warnings)
    #[arg(long)]
    force: bool,

    /// Enable the tracker's auto-merge instead of merging immediately
    #[arg(long)]
    auto: bool,

    /// Merge strategy: merge, squash, or rebase
    #[arg(long, default_value = "merge")]
    strategy: String,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    assume_yes: bool,

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
    // clap exits 2 on parse errors by default; input errors are exit 1 here,
    // so map them by hand
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let strategy = match MergeMethod::parse(&cli.strategy) {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let options = MergeOptions {
        pr_arg: cli.pr_number,
        dry_run: cli.dry_run,
        force: cli.force,
        auto: cli.auto,
        strategy,
        assume_yes: cli.assume_yes,
    };

    match run_merge(&cli.path, cli.remote.as_deref(), cli.verbose, options).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => report(&e),
    }
}

/// Print an error (and its hint, when one exists) and produce exit code 1.
fn report(e: &Error) -> ExitCode {
    anstream::eprintln!("{} {e}", "error:".warn());
    if let Some(hint) = e.hint() {
        anstream::eprintln!("{}", hint.muted());
    }
    ExitCode::from(1)
}
