//! Git subprocess layer
//!
//! Every operation is a blocking call to the `git` binary. The [`Vcs`] trait
//! is the seam the guard and cleanup stages work against, so tests can inject
//! failures (e.g. a worktree removal that hits a permission error) without a
//! real repository.

mod worktree;

pub use worktree::parse_worktree_list;

use crate::error::{Error, Result};
use crate::types::{GitRemote, Worktree};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Version-control operations used by the merge pipeline
pub trait Vcs: Send + Sync {
    /// Root of the checkout the process was started in
    fn repo_root(&self) -> &Path;

    /// Name of the currently checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Whether the working tree at `dir` has no uncommitted changes
    fn is_clean(&self, dir: &Path) -> Result<bool>;

    /// All worktrees linked to this repository, main worktree first
    fn list_worktrees(&self) -> Result<Vec<Worktree>>;

    /// The repository's actual default branch on `remote` (queried, not
    /// assumed to be literally "main")
    fn default_branch(&self, remote: &str) -> Result<String>;

    /// Check out `branch` in the checkout at `dir`
    fn checkout(&self, dir: &Path, branch: &str) -> Result<()>;

    /// Fetch from `remote` in the checkout at `dir`
    fn fetch(&self, dir: &Path, remote: &str) -> Result<()>;

    /// Pull the current branch in the checkout at `dir`
    fn pull(&self, dir: &Path) -> Result<()>;

    /// Remove the worktree at `path`, operating from the main checkout
    fn remove_worktree(&self, main_repo: &Path, path: &Path) -> Result<()>;

    /// Prune stale worktree metadata, operating from the main checkout
    fn prune_worktrees(&self, main_repo: &Path) -> Result<()>;

    /// Configured remotes
    fn remotes(&self) -> Result<Vec<GitRemote>>;
}

/// A local git repository driven through the `git` binary
pub struct GitRepo {
    root: PathBuf,
    verbose: bool,
}

impl GitRepo {
    /// Open the repository containing `path`.
    ///
    /// Fails with a prerequisite error when `path` is not inside a git
    /// repository or the `git` binary is missing.
    pub fn open(path: &Path, verbose: bool) -> Result<Self> {
        let probe = Self {
            root: path.to_path_buf(),
            verbose,
        };
        let top = probe
            .run(path, &["rev-parse", "--show-toplevel"])
            .map_err(|_| {
                Error::Prerequisite(format!(
                    "not a git repository: {} (or git is not installed)",
                    path.display()
                ))
            })?;
        Ok(Self {
            root: PathBuf::from(top.trim()),
            verbose,
        })
    }

    /// Run a git command in `dir`, returning trimmed stdout.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        if self.verbose {
            anstream::eprintln!("+ git -C {} {}", dir.display(), args.join(" "));
        }
        debug!(dir = %dir.display(), args = ?args, "running git");

        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Vcs for GitRepo {
    fn repo_root(&self) -> &Path {
        &self.root
    }

    fn current_branch(&self) -> Result<String> {
        let branch = self.run(&self.root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(branch.trim().to_string())
    }

    fn is_clean(&self, dir: &Path) -> Result<bool> {
        let status = self.run(dir, &["status", "--porcelain"])?;
        Ok(status.trim().is_empty())
    }

    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        let listing = self.run(&self.root, &["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&listing))
    }

    fn default_branch(&self, remote: &str) -> Result<String> {
        // Fast path: the symbolic ref recorded at clone time
        let head_ref = format!("refs/remotes/{remote}/HEAD");
        if let Ok(full) = self.run(&self.root, &["symbolic-ref", "--short", &head_ref]) {
            let prefix = format!("{remote}/");
            if let Some(branch) = full.trim().strip_prefix(&prefix) {
                return Ok(branch.to_string());
            }
        }

        // Slow path: ask the remote directly
        let show = self.run(&self.root, &["remote", "show", remote])?;
        show.lines()
            .find_map(|line| line.trim().strip_prefix("HEAD branch: "))
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Git(format!("could not determine default branch for '{remote}'"))
            })
    }

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run(dir, &["checkout", branch]).map(|_| ())
    }

    fn fetch(&self, dir: &Path, remote: &str) -> Result<()> {
        self.run(dir, &["fetch", remote]).map(|_| ())
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["pull", "--ff-only"]).map(|_| ())
    }

    fn remove_worktree(&self, main_repo: &Path, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.run(main_repo, &["worktree", "remove", path_str.as_ref()])
            .map(|_| ())
    }

    fn prune_worktrees(&self, main_repo: &Path) -> Result<()> {
        self.run(main_repo, &["worktree", "prune"]).map(|_| ())
    }

    fn remotes(&self) -> Result<Vec<GitRemote>> {
        let output = self.run(&self.root, &["remote", "-v"])?;
        let mut remotes: Vec<GitRemote> = Vec::new();

        for line in output.lines() {
            // Format: "<name>\t<url> (fetch|push)"
            let mut parts = line.split_whitespace();
            let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
                continue;
            };
            if remotes.iter().any(|r| r.name == name) {
                continue;
            }
            remotes.push(GitRemote {
                name: name.to_string(),
                url: url.to_string(),
            });
        }

        Ok(remotes)
    }
}

/// Pick the remote to use: an explicit choice must exist, otherwise prefer
/// "origin", otherwise a single configured remote.
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        if remotes.iter().any(|r| r.name == name) {
            return Ok(name.to_string());
        }
        return Err(Error::Git(format!("remote '{name}' not found")));
    }

    if remotes.iter().any(|r| r.name == "origin") {
        return Ok("origin".to_string());
    }

    match remotes {
        [] => Err(Error::Prerequisite(
            "no git remotes configured; add one with 'git remote add'".to_string(),
        )),
        [only] => Ok(only.name.clone()),
        _ => Err(Error::Git(
            "multiple remotes configured and none is 'origin'; pass --remote".to_string(),
        )),
    }
}
