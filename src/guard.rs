//! Workspace guard
//!
//! Refuses to proceed when the process runs inside a secondary worktree for
//! the target branch and that working tree has uncommitted changes, to avoid
//! stranding work when the worktree is removed post-merge.

use crate::error::{Error, Result};
use crate::git::Vcs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the process is running relative to the repository's worktrees
#[derive(Debug, Clone)]
pub struct WorkspaceStatus {
    /// Whether the process runs inside a secondary worktree checked out on
    /// the target branch
    pub in_worktree: bool,
    /// Path of that worktree, when `in_worktree`
    pub worktree_path: Option<PathBuf>,
    /// Path of the main worktree (the original clone)
    pub main_repo_path: PathBuf,
    /// Whether the relevant working tree has no uncommitted changes
    pub is_clean: bool,
}

/// Inspect the worktree layout relative to `cwd` and `head_branch`.
///
/// Read-only; running it twice with no intervening changes yields the same
/// verdict both times.
pub fn inspect(vcs: &dyn Vcs, cwd: &Path, head_branch: &str) -> Result<WorkspaceStatus> {
    let worktrees = vcs.list_worktrees()?;

    let main = worktrees
        .iter()
        .find(|wt| wt.is_main)
        .ok_or_else(|| Error::Internal("worktree listing has no main entry".to_string()))?;
    let main_repo_path = main.path.clone();

    let target = worktrees.iter().find(|wt| {
        !wt.is_main && wt.branch.as_deref() == Some(head_branch) && cwd.starts_with(&wt.path)
    });

    let Some(worktree) = target else {
        debug!(branch = head_branch, "not operating from a worktree of the target branch");
        return Ok(WorkspaceStatus {
            in_worktree: false,
            worktree_path: None,
            main_repo_path,
            is_clean: true,
        });
    };

    let is_clean = vcs.is_clean(&worktree.path)?;
    debug!(
        worktree = %worktree.path.display(),
        is_clean,
        "operating from a worktree of the target branch"
    );

    Ok(WorkspaceStatus {
        in_worktree: true,
        worktree_path: Some(worktree.path.clone()),
        main_repo_path,
        is_clean,
    })
}

/// Halt with an explanatory message when the guarded worktree is dirty.
///
/// Offers the three resolutions and takes no further action. Callers skip
/// this check entirely in auto-merge mode, because no immediate cleanup will
/// occur.
pub fn ensure_clean(status: &WorkspaceStatus) -> Result<()> {
    if !status.in_worktree || status.is_clean {
        return Ok(());
    }

    let path = status
        .worktree_path
        .as_deref()
        .unwrap_or_else(|| Path::new("?"));

    Err(Error::DirtyWorkspace(format!(
        "worktree {} has uncommitted changes; merging would remove it and strand them.\n\
         Resolve one of these ways:\n\
         \u{20}  1. commit the changes:  git add -A && git commit\n\
         \u{20}  2. stash them:          git stash\n\
         \u{20}  3. defer the merge:     workflow-merge --auto",
        path.display()
    )))
}
