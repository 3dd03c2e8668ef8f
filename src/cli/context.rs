//! Shared command context
//!
//! Encapsulates the setup common to both binaries: opening the repository,
//! selecting and validating the remote, resolving auth, and creating the
//! tracker service. All ambient state (current directory, environment) is
//! read here, at the process boundary; the stages downstream only see the
//! resulting struct.

use crate::auth::get_github_auth;
use crate::error::{Error, Result};
use crate::git::{GitRepo, Vcs, select_remote};
use crate::platform::{TrackerService, create_tracker_service, parse_repo_info};
use std::path::{Path, PathBuf};

/// Everything a command needs to talk to the repository and its tracker
pub struct CommandContext {
    /// Version-control operations
    pub vcs: Box<dyn Vcs>,
    /// Tracker (PR) operations
    pub tracker: Box<dyn TrackerService>,
    /// Root of the checkout the process started in
    pub repo_root: PathBuf,
    /// Directory the process was started from
    pub cwd: PathBuf,
    /// Selected remote name
    pub remote_name: String,
    /// The repository's default branch on that remote
    pub default_branch: String,
}

impl CommandContext {
    /// Build the context for a real invocation.
    pub fn new(path: &Path, remote: Option<&str>, verbose: bool) -> Result<Self> {
        let git = GitRepo::open(path, verbose)?;
        let repo_root = git.repo_root().to_path_buf();

        let remotes = git.remotes()?;
        let remote_name = select_remote(&remotes, remote)?;
        let remote_info = remotes
            .iter()
            .find(|r| r.name == remote_name)
            .ok_or_else(|| Error::Git(format!("remote '{remote_name}' not found")))?;

        let platform_config = parse_repo_info(&remote_info.url)?;
        let auth = get_github_auth()?;
        let tracker = create_tracker_service(&platform_config, &auth.token)?;

        let default_branch = git.default_branch(&remote_name)?;

        let cwd = std::env::current_dir()
            .map_err(|e| Error::Internal(format!("cannot determine current directory: {e}")))?;

        Ok(Self {
            vcs: Box::new(git),
            tracker,
            repo_root,
            cwd,
            remote_name,
            default_branch,
        })
    }

    /// Assemble a context from pre-built parts (used by tests to inject
    /// mock services).
    #[must_use]
    pub fn from_parts(
        vcs: Box<dyn Vcs>,
        tracker: Box<dyn TrackerService>,
        cwd: PathBuf,
        remote_name: String,
        default_branch: String,
    ) -> Self {
        let repo_root = vcs.repo_root().to_path_buf();
        Self {
            vcs,
            tracker,
            repo_root,
            cwd,
            remote_name,
            default_branch,
        }
    }
}
