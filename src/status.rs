//! Read-only repository status summary
//!
//! Backs the `workflow-status` binary. Unlike the merge path, this surface is
//! read-heavy and latency-sensitive, so the dirty flag and open-PR count are
//! memoized through the file cache.

use crate::cache::{StatusCache, StatusSnapshot};
use crate::error::Result;
use crate::git::Vcs;
use crate::platform::TrackerService;

/// A point-in-time repository summary
#[derive(Debug, Clone)]
pub struct RepoStatus {
    /// Currently checked-out branch
    pub branch: String,
    /// Whether the working tree has uncommitted changes
    pub dirty: bool,
    /// Number of open PRs
    pub open_pr_count: u64,
    /// Whether dirty/open-PR figures came from the cache
    pub from_cache: bool,
}

/// Gather the status summary, serving from a fresh cache entry when one
/// exists and recomputing (and overwriting the cache) otherwise.
///
/// The branch name is always read live; only the expensive parts are cached.
pub async fn gather(
    vcs: &dyn Vcs,
    tracker: &dyn TrackerService,
    cache: &StatusCache,
) -> Result<RepoStatus> {
    let branch = vcs.current_branch()?;
    let repo_root = vcs.repo_root();

    if let Some(snapshot) = cache.load(repo_root)? {
        return Ok(RepoStatus {
            branch,
            dirty: snapshot.dirty,
            open_pr_count: snapshot.open_pr_count,
            from_cache: true,
        });
    }

    let dirty = !vcs.is_clean(repo_root)?;
    let open_pr_count = tracker.count_open_prs().await?;

    cache.store(
        repo_root,
        &StatusSnapshot {
            dirty,
            open_pr_count,
        },
    )?;

    Ok(RepoStatus {
        branch,
        dirty,
        open_pr_count,
        from_cache: false,
    })
}
