//! Parser for `git worktree list --porcelain` output
//!
//! Records are separated by blank lines. Each record starts with a
//! `worktree <path>` line followed by attribute lines: `HEAD <sha>`,
//! `branch refs/heads/<name>`, or the bare markers `detached` / `bare`.
//! The first record is always the main worktree (the original clone).

use crate::types::Worktree;
use std::path::PathBuf;

/// Parse the porcelain worktree listing into records.
///
/// Unrecognized attribute lines are ignored so newer git versions do not
/// break the parser.
#[must_use]
pub fn parse_worktree_list(output: &str) -> Vec<Worktree> {
    let mut worktrees = Vec::new();
    let mut current: Option<Worktree> = None;
    let mut first = true;

    for line in output.lines() {
        if line.is_empty() {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("worktree ") {
            // A new record without a separating blank line still closes the
            // previous one
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            current = Some(Worktree {
                path: PathBuf::from(path),
                branch: None,
                head_commit: String::new(),
                is_main: first,
            });
            first = false;
        } else if let Some(wt) = current.as_mut() {
            if let Some(sha) = line.strip_prefix("HEAD ") {
                wt.head_commit = sha.to_string();
            } else if let Some(branch_ref) = line.strip_prefix("branch ") {
                wt.branch = Some(
                    branch_ref
                        .strip_prefix("refs/heads/")
                        .unwrap_or(branch_ref)
                        .to_string(),
                );
            } else if line == "detached" {
                wt.branch = None;
            }
        }
    }

    if let Some(wt) = current.take() {
        worktrees.push(wt);
    }

    worktrees
}
