//! File-based status cache with a time-to-live
//!
//! Memoizes the read-heavy status summary (dirty flag plus open-PR count) so
//! repeated status invocations stay off the network. One JSON file per
//! repository, keyed by a hash of the repository path; freshness is judged by
//! file modification time. Each writer recomputes the whole snapshot and
//! overwrites atomically (temp file + rename), so there is nothing to lock.
//!
//! The merge path never reads this cache; PR state there is always fetched
//! fresh.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default freshness window
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cached repository status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Whether the working tree had uncommitted changes
    pub dirty: bool,
    /// Number of open PRs at snapshot time
    pub open_pr_count: u64,
}

/// Cache of [`StatusSnapshot`] files under a single directory
pub struct StatusCache {
    dir: PathBuf,
    ttl: Duration,
}

impl StatusCache {
    /// Cache rooted in the user cache directory with the default TTL.
    pub fn new() -> Result<Self> {
        let base = dirs::cache_dir()
            .ok_or_else(|| Error::Cache("no user cache directory".to_string()))?;
        Ok(Self {
            dir: base.join("workflow-merge"),
            ttl: DEFAULT_TTL,
        })
    }

    /// Cache rooted at an explicit directory (used by tests).
    #[must_use]
    pub const fn with_dir(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    /// Same cache with a different freshness window. A TTL of zero treats
    /// every existing entry as stale, forcing recomputation.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cache file path for a repository, keyed by a hash of its path.
    #[must_use]
    pub fn path_for(&self, repo_root: &Path) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        repo_root.hash(&mut hasher);
        self.dir.join(format!("status-{:016x}.json", hasher.finish()))
    }

    /// Load the snapshot for a repository if it exists and is fresh.
    pub fn load(&self, repo_root: &Path) -> Result<Option<StatusSnapshot>> {
        let path = self.path_for(repo_root);

        let Ok(metadata) = fs::metadata(&path) else {
            return Ok(None);
        };

        let age = metadata
            .modified()
            .ok()
            .and_then(|mtime| mtime.elapsed().ok());
        match age {
            Some(age) if age <= self.ttl => {}
            _ => {
                debug!(path = %path.display(), "cache entry stale");
                return Ok(None);
            }
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Cache(format!("failed to read {}: {e}", path.display())))?;
        let snapshot: StatusSnapshot = serde_json::from_str(&content)
            .map_err(|e| Error::Cache(format!("failed to parse {}: {e}", path.display())))?;

        debug!(path = %path.display(), "cache hit");
        Ok(Some(snapshot))
    }

    /// Store a snapshot, overwriting any previous one atomically.
    pub fn store(&self, repo_root: &Path, snapshot: &StatusSnapshot) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .map_err(|e| Error::Cache(format!("failed to create {}: {e}", self.dir.display())))?;
        }

        let path = self.path_for(repo_root);
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|e| Error::Cache(format!("failed to serialize snapshot: {e}")))?;

        // Write-then-rename so readers never observe a partial file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .map_err(|e| Error::Cache(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| Error::Cache(format!("failed to rename {}: {e}", tmp.display())))?;

        debug!(path = %path.display(), "cache updated");
        Ok(())
    }
}
