//! Merge command - validate, confirm, merge, clean up
//!
//! Phased like the rest of the pipeline:
//! 1. Gather - resolve the PR and fetch its state (effectful, read-only)
//! 2. Check - confirmation stage, aggregate validation, workspace guard
//! 3. Execute - merge (or enable auto-merge), then cleanup
//!
//! Validation failures are reported in aggregate so the user sees the whole
//! picture in one pass; merge execution failures abort immediately; cleanup
//! failures degrade to exit code 2 without undoing the merge.

use crate::cleanup::{self, CleanupOutcome};
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, link, spinner_style, warn_sign};
use crate::error::{Error, Result};
use crate::guard;
use crate::resolve;
use crate::types::{MergeMethod, MergeOutcome, MergeSession, PrState, PullRequestDetails};
use crate::validate;
use anstream::println;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Explicit PR number as given on the command line
    pub pr_arg: Option<String>,
    /// Simulate without mutating anything
    pub dry_run: bool,
    /// Bypass validation failures (still surfaced as warnings)
    pub force: bool,
    /// Enable deferred merge-when-ready instead of merging immediately
    pub auto: bool,
    /// Merge strategy
    pub strategy: MergeMethod,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

/// Run the merge command against a real repository.
pub async fn run_merge(
    path: &Path,
    remote: Option<&str>,
    verbose: bool,
    options: MergeOptions,
) -> Result<MergeOutcome> {
    // Reject malformed input before touching the repository or the network
    if let Some(arg) = options.pr_arg.as_deref() {
        resolve::validate_pr_argument(arg)?;
    }

    let ctx = CommandContext::new(path, remote, verbose)?;
    merge_with_context(&ctx, &options).await
}

/// The merge pipeline, driven through an already-built context.
///
/// Split out from [`run_merge`] so tests can inject mock services.
#[allow(clippy::too_many_lines)]
pub async fn merge_with_context(
    ctx: &CommandContext,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    // =========================================================================
    // Phase 1: GATHER - resolve the PR and fetch its state
    // =========================================================================

    let current_branch = ctx.vcs.current_branch()?;
    let pr_number = resolve::resolve_pr(
        options.pr_arg.as_deref(),
        &current_branch,
        ctx.tracker.as_ref(),
    )
    .await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Fetching PR #{pr_number}..."));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let details = ctx.tracker.pr_details(pr_number).await?;

    spinner.finish_and_clear();
    print_pr_summary(&details, options);

    // Confirmation stage: only open, non-draft PRs go further
    if details.state != PrState::Open {
        return Err(Error::PrNotOpen(details.state));
    }
    if details.is_draft {
        return Err(Error::PrDraft);
    }

    let failing_checks = ctx.tracker.failing_checks(&details.head_ref).await?;

    // =========================================================================
    // Phase 2: CHECK - aggregate validation and workspace guard
    // =========================================================================

    let mut session = MergeSession {
        pr_number,
        // Captured before the merge call; harder to query afterwards
        branch_name: details.head_ref.clone(),
        strategy: options.strategy,
        ..MergeSession::default()
    };

    let failures = validate::evaluate(&details, &failing_checks);
    if !failures.is_empty() {
        println!();
        for failure in &failures {
            println!("  {} {failure}", warn_sign());
        }
        if options.force {
            println!(
                "{}",
                format!(
                    "--force set; proceeding despite {} validation failure(s)",
                    failures.len()
                )
                .warn()
            );
            session.warning_count += u32::try_from(failures.len()).unwrap_or(u32::MAX);
        } else {
            return Err(Error::Validation(failures.len()));
        }
    }

    for note in validate::uncertainties(&details) {
        println!("  {}", format!("note: {note}").muted());
    }

    // Workspace guard: skipped in auto-merge mode, because no immediate
    // cleanup will occur
    if options.auto {
        session.main_repo_path = ctx.repo_root.clone();
    } else {
        let workspace = guard::inspect(ctx.vcs.as_ref(), &ctx.cwd, &details.head_ref)?;
        session.in_worktree = workspace.in_worktree;
        session.worktree_path = workspace.worktree_path.clone();
        session.main_repo_path = workspace.main_repo_path.clone();

        if options.dry_run {
            if !workspace.is_clean {
                println!(
                    "  {} worktree has uncommitted changes; a real run would halt here",
                    warn_sign()
                );
            }
        } else {
            guard::ensure_clean(&workspace)?;
        }
    }

    // =========================================================================
    // Phase 3: EXECUTE - merge (or defer), then cleanup
    // =========================================================================

    if options.dry_run {
        report_dry_run(&session, options, ctx);
        return Ok(MergeOutcome::DryRun);
    }

    if !options.assume_yes && std::io::stdin().is_terminal() {
        let prompt = if options.auto {
            format!("Enable auto-merge for PR #{pr_number}?")
        } else {
            format!("Merge PR #{pr_number} ({})?", options.strategy)
        };
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("failed to read confirmation: {e}")))?;
        if !confirmed {
            println!("{}", "Aborted".muted());
            return Ok(MergeOutcome::Aborted);
        }
    }

    if options.auto {
        ctx.tracker
            .enable_auto_merge(pr_number, options.strategy)
            .await?;
        println!(
            "{} Auto-merge enabled for PR #{}; it will merge once all conditions pass",
            check(),
            pr_number.accent()
        );
        return Ok(MergeOutcome::AutoMergeEnabled);
    }

    debug!(pr_number, strategy = %options.strategy, "executing merge");
    let result = ctx.tracker.merge_pr(pr_number, options.strategy).await?;
    if !result.merged {
        // The API answered but did not merge; nothing was mutated that we
        // can safely continue from
        return Err(Error::MergeFailed(
            result
                .message
                .unwrap_or_else(|| "tracker reported the PR as not merged".to_string()),
        ));
    }
    session.merge_succeeded = true;

    let sha_display = result.sha.as_deref().unwrap_or("(no sha)");
    println!(
        "{} Merged PR #{}: {}",
        check(),
        pr_number.accent(),
        sha_display.muted()
    );

    let outcome = cleanup::run(
        &session,
        ctx.vcs.as_ref(),
        ctx.tracker.as_ref(),
        &ctx.remote_name,
        &ctx.default_branch,
    )
    .await;

    match outcome {
        CleanupOutcome::Complete => {
            if session.in_worktree {
                println!("{} Removed worktree and deleted remote branch", check());
            } else {
                println!(
                    "{} Deleted remote branch {}",
                    check(),
                    session.branch_name.accent()
                );
            }
            if session.warning_count > 0 {
                println!(
                    "{}",
                    format!("completed with {} warning(s)", session.warning_count).warn()
                );
            }
            Ok(MergeOutcome::Merged)
        }
        CleanupOutcome::Incomplete {
            branch,
            reason,
            recovery,
        } => {
            println!();
            println!("{} Merge succeeded but cleanup did not finish: {reason}", warn_sign());
            println!(
                "   Branch {} was preserved. Finish manually:",
                branch.accent()
            );
            for (i, step) in recovery.iter().enumerate() {
                println!("   {}. {step}", i + 1);
            }
            Ok(MergeOutcome::MergedWithWarnings)
        }
    }
}

/// Print the PR summary shown at the confirmation stage.
fn print_pr_summary(details: &PullRequestDetails, options: &MergeOptions) {
    let title = link(&details.title, &details.html_url);
    println!(
        "{} {}",
        format!("PR #{}:", details.number).emphasis(),
        title
    );
    println!(
        "   {} by {}   {} \u{2192} {}",
        details.state.to_string().muted(),
        details.author.accent(),
        details.head_ref.accent(),
        details.base_ref.accent()
    );
    println!("   strategy: {}", options.strategy.to_string().accent());
}

/// Report what a real run would do (dry run).
fn report_dry_run(session: &MergeSession, options: &MergeOptions, ctx: &CommandContext) {
    println!();
    println!("{}:", "Dry run".emphasis());
    if options.auto {
        println!(
            "  Would enable auto-merge for PR #{} ({})",
            session.pr_number,
            options.strategy
        );
        return;
    }
    println!(
        "  Would merge PR #{} with strategy '{}'",
        session.pr_number, options.strategy
    );
    if session.in_worktree {
        if let Some(ref path) = session.worktree_path {
            println!("  Would remove worktree {}", path.display().accent());
        }
        println!(
            "  Would update {} on the {} checkout",
            ctx.default_branch.accent(),
            "main".muted()
        );
    }
    println!(
        "  Would delete remote branch {} afterwards",
        session.branch_name.accent()
    );
    println!();
    println!("{}", "Run without --dry-run to execute.".muted());
}
