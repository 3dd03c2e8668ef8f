//! Repository detection from git remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use url::Url;

/// Parse owner, repo, and host out of a git remote URL.
///
/// Handles the three common forms:
/// - `https://github.com/owner/repo.git`
/// - `git@github.com:owner/repo.git` (scp-like)
/// - `ssh://git@github.com/owner/repo.git`
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let (host, path) = if let Some(rest) = remote_url.strip_prefix("git@") {
        // scp-like syntax has no scheme; split on the first colon
        let (host, path) = rest.split_once(':').ok_or_else(|| {
            Error::Git(format!("unrecognized remote URL: {remote_url}"))
        })?;
        (host.to_string(), path.to_string())
    } else {
        let url = Url::parse(remote_url)
            .map_err(|e| Error::Git(format!("unrecognized remote URL '{remote_url}': {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Git(format!("remote URL has no host: {remote_url}")))?
            .to_string();
        (host, url.path().trim_start_matches('/').to_string())
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    let mut segments = path.split('/');
    let (Some(owner), Some(repo)) = (segments.next(), segments.next()) else {
        return Err(Error::Git(format!(
            "could not extract owner/repo from remote URL: {remote_url}"
        )));
    };
    if owner.is_empty() || repo.is_empty() || segments.next().is_some() {
        return Err(Error::Git(format!(
            "could not extract owner/repo from remote URL: {remote_url}"
        )));
    }

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != "github.com").then_some(host),
    })
}
