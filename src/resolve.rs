//! PR resolution
//!
//! Determines which pull request to act on: explicit argument, current-branch
//! lookup, or issue-number inference from the branch name. Ambiguous cases
//! error rather than picking arbitrarily.

use crate::error::{Error, Result};
use crate::platform::TrackerService;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Upper bound on PR-number length, enforced before any network call
const MAX_PR_DIGITS: usize = 10;

static PR_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

/// A named branch-name rule for extracting an issue number
struct IssueRule {
    name: &'static str,
    pattern: Regex,
}

/// The recognized issue-number patterns, in priority order.
///
/// Order matters: the first matching rule wins, and the tests pin both the
/// extraction and the ordering.
static ISSUE_RULES: LazyLock<[IssueRule; 4]> = LazyLock::new(|| {
    [
        IssueRule {
            name: "issue-prefix",
            pattern: Regex::new(r"issue-(\d+)").expect("valid regex"),
        },
        IssueRule {
            name: "hash-number",
            pattern: Regex::new(r"#(\d+)").expect("valid regex"),
        },
        IssueRule {
            name: "leading-number",
            pattern: Regex::new(r"^(\d+)-").expect("valid regex"),
        },
        IssueRule {
            name: "typed-branch",
            pattern: Regex::new(r"(?:feature|bugfix|hotfix)-(\d+)").expect("valid regex"),
        },
    ]
});

/// Validate a caller-supplied PR identifier: digits only, bounded length.
pub fn validate_pr_argument(arg: &str) -> Result<u64> {
    if !PR_NUMBER.is_match(arg) {
        return Err(Error::Usage(format!(
            "Invalid PR number: '{arg}' (must be digits only)"
        )));
    }
    if arg.len() > MAX_PR_DIGITS {
        return Err(Error::Usage(format!(
            "Invalid PR number: '{arg}' (more than {MAX_PR_DIGITS} digits)"
        )));
    }
    arg.parse::<u64>()
        .map_err(|e| Error::Internal(format!("PR number parse: {e}")))
}

/// Extract an issue number from a branch name, or `None` when no rule
/// matches. Never guesses beyond the four rules.
#[must_use]
pub fn extract_issue_number(branch: &str) -> Option<u64> {
    for rule in ISSUE_RULES.iter() {
        if let Some(caps) = rule.pattern.captures(branch)
            && let Some(m) = caps.get(1)
            && let Ok(number) = m.as_str().parse::<u64>()
        {
            debug!(branch, rule = rule.name, number, "issue number extracted");
            return Some(number);
        }
    }
    debug!(branch, "no issue-number rule matched");
    None
}

/// Produce exactly one target PR number, or fail with "could not infer".
///
/// Priority order:
/// 1. explicit argument (validated, no network)
/// 2. unique open PR whose head branch is the current branch
/// 3. issue number from the branch name, then the first open PR whose title
///    mentions it
pub async fn resolve_pr(
    explicit: Option<&str>,
    current_branch: &str,
    tracker: &dyn TrackerService,
) -> Result<u64> {
    if let Some(arg) = explicit {
        return validate_pr_argument(arg);
    }

    let by_head = tracker.find_open_prs_by_head(current_branch).await?;
    match by_head.as_slice() {
        [only] => return Ok(*only),
        [] => {}
        many => {
            return Err(Error::Resolution(format!(
                "{} open PRs have head branch '{current_branch}'",
                many.len()
            )));
        }
    }

    if let Some(issue) = extract_issue_number(current_branch) {
        let matches = tracker.search_open_prs_mentioning(issue).await?;
        if let Some(first) = matches.first() {
            debug!(issue, pr_number = first, "resolved PR via issue number");
            return Ok(*first);
        }
    }

    Err(Error::Resolution(format!(
        "no open PR found for branch '{current_branch}'"
    )))
}
