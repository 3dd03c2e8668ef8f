//! Cleanup coordinator - post-merge worktree removal and branch deletion
//!
//! Entered only after a successful merge. The ordering here is the one
//! correctness property this tool exists to protect: the remote branch is
//! deleted if and only if worktree removal succeeded. Every failure is
//! handled locally and translated into recovery instructions; nothing here
//! aborts the (already successful) merge.

use crate::git::Vcs;
use crate::platform::TrackerService;
use crate::types::MergeSession;
use tracing::debug;

/// Result of the cleanup stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Worktree (if any) removed and remote branch deleted
    Complete,
    /// Cleanup stopped early; the remote branch was preserved (or its
    /// deletion failed) and manual steps are required
    Incomplete {
        /// The preserved branch name
        branch: String,
        /// Why cleanup stopped
        reason: String,
        /// Numbered manual recovery steps
        recovery: Vec<String>,
    },
}

/// Run post-merge cleanup for the session.
///
/// Not in a worktree: delete the remote branch immediately. In a worktree:
/// re-verify clean, move the main checkout to the default branch, fetch and
/// pull, remove the worktree, prune stale metadata, and only then delete the
/// remote branch.
pub async fn run(
    session: &MergeSession,
    vcs: &dyn Vcs,
    tracker: &dyn TrackerService,
    remote: &str,
    default_branch: &str,
) -> CleanupOutcome {
    debug_assert!(session.merge_succeeded, "cleanup requires a merged PR");
    let branch = &session.branch_name;

    if !session.in_worktree {
        // Nothing else to protect
        return match tracker.delete_branch(branch).await {
            Ok(()) => {
                debug!(branch, "remote branch deleted");
                CleanupOutcome::Complete
            }
            Err(e) => CleanupOutcome::Incomplete {
                branch: branch.clone(),
                reason: format!("branch deletion failed: {e}"),
                recovery: vec![format!("git push {remote} --delete '{branch}'")],
            },
        };
    }

    let Some(worktree_path) = session.worktree_path.as_deref() else {
        return CleanupOutcome::Incomplete {
            branch: branch.clone(),
            reason: "worktree path unknown".to_string(),
            recovery: recovery_steps(session, remote),
        };
    };
    let main_repo = &session.main_repo_path;

    // Defense in depth: the guard checked pre-merge, but re-verify before
    // destroying the worktree
    match vcs.is_clean(worktree_path) {
        Ok(true) => {}
        Ok(false) => {
            return CleanupOutcome::Incomplete {
                branch: branch.clone(),
                reason: format!(
                    "worktree {} has uncommitted changes",
                    worktree_path.display()
                ),
                recovery: recovery_steps(session, remote),
            };
        }
        Err(e) => {
            return CleanupOutcome::Incomplete {
                branch: branch.clone(),
                reason: format!("could not verify worktree state: {e}"),
                recovery: recovery_steps(session, remote),
            };
        }
    }

    // Move the main checkout onto the updated default branch before touching
    // the worktree
    let refresh = vcs
        .checkout(main_repo, default_branch)
        .and_then(|()| vcs.fetch(main_repo, remote))
        .and_then(|()| vcs.pull(main_repo));
    if let Err(e) = refresh {
        return CleanupOutcome::Incomplete {
            branch: branch.clone(),
            reason: format!("could not update main checkout: {e}"),
            recovery: recovery_steps(session, remote),
        };
    }

    if let Err(e) = vcs.remove_worktree(main_repo, worktree_path) {
        // Branch deletion is withheld whenever removal fails
        return CleanupOutcome::Incomplete {
            branch: branch.clone(),
            reason: format!("worktree removal failed: {e}"),
            recovery: recovery_steps(session, remote),
        };
    }

    if let Err(e) = vcs.prune_worktrees(main_repo) {
        return CleanupOutcome::Incomplete {
            branch: branch.clone(),
            reason: format!("worktree prune failed: {e}"),
            recovery: recovery_steps(session, remote),
        };
    }

    debug!(worktree = %worktree_path.display(), "worktree removed");

    // Only after worktree removal succeeds
    match tracker.delete_branch(branch).await {
        Ok(()) => {
            debug!(branch, "remote branch deleted");
            CleanupOutcome::Complete
        }
        Err(e) => CleanupOutcome::Incomplete {
            branch: branch.clone(),
            reason: format!("branch deletion failed: {e}"),
            recovery: vec![format!("git push {remote} --delete '{branch}'")],
        },
    }
}

/// The four manual commands that finish cleanup by hand.
fn recovery_steps(session: &MergeSession, remote: &str) -> Vec<String> {
    let worktree = session
        .worktree_path
        .as_deref()
        .map_or_else(|| "<worktree-path>".to_string(), |p| p.display().to_string());

    vec![
        format!("cd {}", session.main_repo_path.display()),
        format!("git worktree remove --force '{worktree}'"),
        "git worktree prune".to_string(),
        format!("git push {remote} --delete '{}'", session.branch_name),
    ]
}
