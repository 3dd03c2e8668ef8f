//! Mock version-control layer for testing
//!
//! Records every mutating call and lets tests mark worktrees dirty or inject
//! failures (e.g. a permission error during worktree removal). `SharedMockVcs`
//! wraps an `Arc<MockVcs>` for the same reason as the mock tracker: tests keep
//! a handle for assertions after boxing a clone into the pipeline (the orphan
//! rule forbids implementing the trait on `Arc<MockVcs>` directly).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use workflow_merge::error::{Error, Result};
use workflow_merge::git::Vcs;
use workflow_merge::types::{GitRemote, Worktree};

/// Mock repository with a configurable worktree layout
pub struct MockVcs {
    root: PathBuf,
    current_branch: Mutex<String>,
    default_branch: String,
    worktrees: Mutex<Vec<Worktree>>,
    dirty_paths: Mutex<HashSet<PathBuf>>,
    // Log of mutating git operations, e.g. "checkout main" or "pull"
    op_log: Mutex<Vec<String>>,
    // Error injection
    error_on_remove_worktree: Mutex<Option<String>>,
    error_on_pull: Mutex<Option<String>>,
}

impl MockVcs {
    /// A repository rooted at `root` with only the main worktree, checked
    /// out on "main"
    pub fn new(root: &str) -> Self {
        let root = PathBuf::from(root);
        let main = Worktree {
            path: root.clone(),
            branch: Some("main".to_string()),
            head_commit: "abc123".to_string(),
            is_main: true,
        };
        Self {
            root,
            current_branch: Mutex::new("main".to_string()),
            default_branch: "main".to_string(),
            worktrees: Mutex::new(vec![main]),
            dirty_paths: Mutex::new(HashSet::new()),
            op_log: Mutex::new(Vec::new()),
            error_on_remove_worktree: Mutex::new(None),
            error_on_pull: Mutex::new(None),
        }
    }

    /// Add a secondary worktree and make it the current checkout
    pub fn add_worktree(&self, path: &str, branch: &str) {
        self.worktrees.lock().unwrap().push(Worktree {
            path: PathBuf::from(path),
            branch: Some(branch.to_string()),
            head_commit: "def456".to_string(),
            is_main: false,
        });
        *self.current_branch.lock().unwrap() = branch.to_string();
    }

    /// Mark a working tree as having uncommitted changes
    pub fn set_dirty(&self, path: &str) {
        self.dirty_paths.lock().unwrap().insert(PathBuf::from(path));
    }

    /// Make `remove_worktree` return an error
    pub fn fail_remove_worktree(&self, msg: &str) {
        *self.error_on_remove_worktree.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `pull` return an error
    pub fn fail_pull(&self, msg: &str) {
        *self.error_on_pull.lock().unwrap() = Some(msg.to_string());
    }

    /// All mutating operations, in order
    pub fn operations(&self) -> Vec<String> {
        self.op_log.lock().unwrap().clone()
    }

    /// Assert no mutating git operation happened
    pub fn assert_no_mutations(&self) {
        let ops = self.operations();
        assert!(ops.is_empty(), "Expected no git mutations but got: {ops:?}");
    }

    fn log(&self, op: String) {
        self.op_log.lock().unwrap().push(op);
    }
}

impl Vcs for MockVcs {
    fn repo_root(&self) -> &Path {
        &self.root
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.current_branch.lock().unwrap().clone())
    }

    fn is_clean(&self, dir: &Path) -> Result<bool> {
        Ok(!self.dirty_paths.lock().unwrap().contains(dir))
    }

    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        Ok(self.worktrees.lock().unwrap().clone())
    }

    fn default_branch(&self, _remote: &str) -> Result<String> {
        Ok(self.default_branch.clone())
    }

    fn checkout(&self, _dir: &Path, branch: &str) -> Result<()> {
        self.log(format!("checkout {branch}"));
        Ok(())
    }

    fn fetch(&self, _dir: &Path, remote: &str) -> Result<()> {
        self.log(format!("fetch {remote}"));
        Ok(())
    }

    fn pull(&self, _dir: &Path) -> Result<()> {
        self.log("pull".to_string());
        if let Some(msg) = self.error_on_pull.lock().unwrap().as_ref() {
            return Err(Error::Git(msg.clone()));
        }
        Ok(())
    }

    fn remove_worktree(&self, _main_repo: &Path, path: &Path) -> Result<()> {
        self.log(format!("worktree remove {}", path.display()));
        if let Some(msg) = self.error_on_remove_worktree.lock().unwrap().as_ref() {
            return Err(Error::Git(msg.clone()));
        }
        self.worktrees.lock().unwrap().retain(|wt| wt.path != path);
        Ok(())
    }

    fn prune_worktrees(&self, _main_repo: &Path) -> Result<()> {
        self.log("worktree prune".to_string());
        Ok(())
    }

    fn remotes(&self) -> Result<Vec<GitRemote>> {
        Ok(vec![GitRemote {
            name: "origin".to_string(),
            url: "git@github.com:acme/widgets.git".to_string(),
        }])
    }
}

/// Boxable handle to a shared `MockVcs`, delegating every call to the inner
/// `Arc` so the test keeps a handle for assertions
pub struct SharedMockVcs(pub Arc<MockVcs>);

impl Vcs for SharedMockVcs {
    fn repo_root(&self) -> &Path {
        self.0.repo_root()
    }

    fn current_branch(&self) -> Result<String> {
        self.0.current_branch()
    }

    fn is_clean(&self, dir: &Path) -> Result<bool> {
        self.0.is_clean(dir)
    }

    fn list_worktrees(&self) -> Result<Vec<Worktree>> {
        self.0.list_worktrees()
    }

    fn default_branch(&self, remote: &str) -> Result<String> {
        self.0.default_branch(remote)
    }

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        self.0.checkout(dir, branch)
    }

    fn fetch(&self, dir: &Path, remote: &str) -> Result<()> {
        self.0.fetch(dir, remote)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        self.0.pull(dir)
    }

    fn remove_worktree(&self, main_repo: &Path, path: &Path) -> Result<()> {
        self.0.remove_worktree(main_repo, path)
    }

    fn prune_worktrees(&self, main_repo: &Path) -> Result<()> {
        self.0.prune_worktrees(main_repo)
    }

    fn remotes(&self) -> Result<Vec<GitRemote>> {
        self.0.remotes()
    }
}
