//! GitHub token discovery
//!
//! Environment variables win over the gh CLI so scripted invocations can
//! pin a token without touching gh state.

use super::AuthSource;
use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// A resolved GitHub token and where it came from
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// The token itself
    pub token: String,
    /// Where the token was found
    pub source: AuthSource,
}

/// Resolve a GitHub token from `GITHUB_TOKEN`, `GH_TOKEN`, or `gh auth token`.
///
/// This is the only place auth state is read from the ambient environment;
/// everything downstream receives the resolved config.
pub fn get_github_auth() -> Result<GitHubAuthConfig> {
    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = std::env::var(var) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!(var, "using token from environment");
                return Ok(GitHubAuthConfig {
                    token,
                    source: AuthSource::EnvVar,
                });
            }
        }
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .map_err(|_| {
            Error::Prerequisite(
                "GitHub CLI (gh) not found and no GITHUB_TOKEN set; \
                 install gh or export a token"
                    .to_string(),
            )
        })?;

    if !output.status.success() {
        return Err(Error::Auth(
            "gh is not authenticated; run 'gh auth login'".to_string(),
        ));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth(
            "gh returned an empty token; run 'gh auth login'".to_string(),
        ));
    }

    debug!("using token from gh CLI");
    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
    })
}

#[cfg(test)]
#[allow(unsafe_code)] // env mutation is unsafe in edition 2024; serialized below
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_token_wins() {
        // SAFETY: serialized; restored before the test ends
        unsafe {
            std::env::set_var("GITHUB_TOKEN", "ghp_testtoken123");
        }
        let auth = get_github_auth().unwrap();
        assert_eq!(auth.token, "ghp_testtoken123");
        assert_eq!(auth.source, AuthSource::EnvVar);
        unsafe {
            std::env::remove_var("GITHUB_TOKEN");
        }
    }

    #[test]
    #[serial]
    fn test_blank_env_var_is_ignored() {
        unsafe {
            std::env::set_var("GITHUB_TOKEN", "   ");
            std::env::set_var("GH_TOKEN", "gho_fallback456");
        }
        let auth = get_github_auth().unwrap();
        assert_eq!(auth.token, "gho_fallback456");
        unsafe {
            std::env::remove_var("GITHUB_TOKEN");
            std::env::remove_var("GH_TOKEN");
        }
    }
}
