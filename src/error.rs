//! Error types for workflow-merge
//!
//! Every stage returns [`Result`]; the orchestrator decides which failures are
//! fatal and which degrade to warnings. Each variant maps to a user-facing
//! message, and [`Error::hint`] supplies the suggested next command where one
//! exists.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// All errors produced by workflow-merge
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input rejected before any side effect (bad PR number,
    /// unknown strategy)
    #[error("{0}")]
    Usage(String),

    /// Missing prerequisite (not a git repository, no auth token)
    #[error("{0}")]
    Prerequisite(String),

    /// Could not determine which PR to act on
    #[error("could not infer PR number: {0}")]
    Resolution(String),

    /// Pre-merge validation failed (count of aggregated failures)
    #[error("{0} validation check(s) failed")]
    Validation(usize),

    /// The working tree blocks the operation (uncommitted changes in a
    /// worktree that would be cleaned up)
    #[error("{0}")]
    DirtyWorkspace(String),

    /// A git subprocess failed
    #[error("git: {0}")]
    Git(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// The PR cannot be merged because it is not open
    #[error("PR is not open (state: {0})")]
    PrNotOpen(crate::types::PrState),

    /// The PR cannot be merged because it is a draft
    #[error("PR is a draft")]
    PrDraft,

    /// The merge call itself failed
    #[error("merge failed: {0}")]
    MergeFailed(String),

    /// Status-cache persistence failure
    #[error("cache: {0}")]
    Cache(String),

    /// Internal error (bug or unexpected state)
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl Error {
    /// Suggested next command for this error, if one applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Usage(_) => Some("Run 'workflow-merge --help' for usage."),
            Self::Auth(_) => Some("Run 'gh auth login' or set GITHUB_TOKEN."),
            Self::Resolution(_) => {
                Some("Pass the PR number explicitly: workflow-merge <PR_NUMBER>")
            }
            Self::Validation(_) => {
                Some("Fix the reported checks, or re-run with --force to override.")
            }
            _ => None,
        }
    }
}
