//! Issue-tracker services
//!
//! Provides the unified interface the merge pipeline uses for PR reads, the
//! merge call, and branch-ref deletion. The tracker is the source of truth
//! for PR state; this tool only reads it and never caches it across
//! invocations on the merge path.

mod detection;
mod github;

pub use detection::parse_repo_info;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{MergeMethod, MergeResult, PlatformConfig, PullRequestDetails};
use async_trait::async_trait;

/// Tracker service trait for PR operations
#[async_trait]
pub trait TrackerService: Send + Sync {
    /// Numbers of all open PRs whose head branch is `head_branch`
    async fn find_open_prs_by_head(&self, head_branch: &str) -> Result<Vec<u64>>;

    /// Numbers of open PRs whose title mentions `issue_number`, best match
    /// first
    async fn search_open_prs_mentioning(&self, issue_number: u64) -> Result<Vec<u64>>;

    /// Total number of open PRs in the repository (status surface)
    async fn count_open_prs(&self) -> Result<u64>;

    /// Full PR details including review decision and merge state
    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestDetails>;

    /// Names of CI checks currently reporting failure for `ref_name`
    ///
    /// Covers both check runs and legacy commit statuses. An empty list means
    /// no check matches a failure pattern.
    async fn failing_checks(&self, ref_name: &str) -> Result<Vec<String>>;

    /// Merge a PR with the specified method.
    ///
    /// The merge call never requests branch deletion; deletion is sequenced
    /// separately by the cleanup stage.
    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult>;

    /// Enable the tracker's native deferred merge for a PR
    async fn enable_auto_merge(&self, pr_number: u64, method: MergeMethod) -> Result<()>;

    /// Delete the remote branch ref
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Get the tracker configuration
    fn config(&self) -> &PlatformConfig;
}

/// Create a tracker service for the given repository configuration.
pub fn create_tracker_service(
    config: &PlatformConfig,
    token: &str,
) -> Result<Box<dyn TrackerService>> {
    let service = GitHubService::new(
        token,
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?;
    Ok(Box::new(service))
}
