//! Core types for workflow-merge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
            Self::Merged => write!(f, "MERGED"),
        }
    }
}

/// Aggregate review decision reported by the tracker
///
/// Unknown values fail deserialization loudly rather than falling through a
/// string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    /// At least one approving review and no blocking ones
    Approved,
    /// A reviewer requested changes
    ChangesRequested,
    /// Branch protection requires a review that has not happened
    ReviewRequired,
    /// No review decision (no required reviewers configured)
    None,
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            Self::ReviewRequired => write!(f, "REVIEW_REQUIRED"),
            Self::None => write!(f, "NONE"),
        }
    }
}

/// Whether the PR can be merged cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeableState {
    /// No conflicts with the base branch
    Mergeable,
    /// Has conflicts that must be resolved first
    Conflicting,
    /// The tracker is still computing mergeability
    Unknown,
}

/// Merge-state status (branch-protection driven)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeStateStatus {
    /// Ready to merge
    Clean,
    /// Blocked by branch protection rules
    Blocked,
    /// Mergeable with non-passing (but not required) checks
    Unstable,
    /// Head branch is behind the base branch
    Behind,
    /// Merge commit cannot be cleanly created
    Dirty,
    /// PR is a draft
    Draft,
    /// Pre-receive hooks are pending
    HasHooks,
    /// State not yet known
    Unknown,
}

/// Extended PR details for merge operations
///
/// Source of truth is the remote tracker; fetched fresh on every invocation of
/// the merge path, never cached across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR author login
    pub author: String,
    /// PR body/description
    pub body: Option<String>,
    /// Current state of the PR
    pub state: PrState,
    /// Whether the PR is a draft
    pub is_draft: bool,
    /// Review decision
    pub review_decision: ReviewDecision,
    /// Mergeability (conflict detection)
    pub mergeable: MergeableState,
    /// Branch-protection merge state
    pub merge_state_status: MergeStateStatus,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Web URL for the PR
    pub html_url: String,
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl MergeMethod {
    /// Parse a strategy name as given on the command line.
    ///
    /// Anything outside the enum is rejected before any network call.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            other => Err(Error::Usage(format!("Invalid merge strategy: {other}"))),
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// A secondary checkout associated with a branch
///
/// Parsed from the porcelain worktree listing. Exactly one worktree is the
/// main one (the original clone); all others are removable once their branch
/// is merged and their working tree is clean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    /// Absolute path of the worktree
    pub path: PathBuf,
    /// Checked-out branch (None when detached)
    pub branch: Option<String>,
    /// HEAD commit (hex)
    pub head_commit: String,
    /// Whether this is the main worktree (the original clone)
    pub is_main: bool,
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Tracker configuration derived from the remote URL
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

/// In-memory state for one merge invocation
///
/// Created at command start and discarded at process exit; its fields gate
/// which cleanup branch executes. Constructed explicitly rather than read from
/// ambient environment inside business logic.
#[derive(Debug, Clone, Default)]
pub struct MergeSession {
    /// Target PR number (set by the resolver)
    pub pr_number: u64,
    /// Head branch name, captured before the merge call
    pub branch_name: String,
    /// Selected merge strategy
    pub strategy: MergeMethod,
    /// Whether the merge call succeeded
    pub merge_succeeded: bool,
    /// Whether the process runs inside a worktree of the head branch
    pub in_worktree: bool,
    /// Path of that worktree (when `in_worktree`)
    pub worktree_path: Option<PathBuf>,
    /// Path of the main repository checkout
    pub main_repo_path: PathBuf,
    /// Errors encountered so far
    pub error_count: u32,
    /// Warnings encountered so far
    pub warning_count: u32,
}

/// Final outcome of a merge invocation, mapped to the process exit code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merge and cleanup both completed (exit 0)
    Merged,
    /// Deferred merge was enabled; nothing to clean up yet (exit 0)
    AutoMergeEnabled,
    /// Dry run: nothing was mutated (exit 0)
    DryRun,
    /// The user declined the confirmation prompt (exit 1)
    Aborted,
    /// Merge succeeded but cleanup only partially completed; the branch was
    /// preserved and manual steps are required (exit 2)
    MergedWithWarnings,
}

impl MergeOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Merged | Self::AutoMergeEnabled | Self::DryRun => 0,
            Self::Aborted => 1,
            Self::MergedWithWarnings => 2,
        }
    }
}
