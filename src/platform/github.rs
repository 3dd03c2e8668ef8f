//! GitHub tracker service implementation

use crate::error::{Error, Result};
use crate::platform::TrackerService;
use crate::types::{
    MergeMethod, MergeResult, MergeStateStatus, MergeableState, PlatformConfig, PrState,
    PullRequestDetails, ReviewDecision,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

// GraphQL response types

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrDetailsData {
    repository: RepositoryNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    pull_request: Option<GraphQlPullRequest>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    url: String,
    state: PrState,
    is_draft: bool,
    review_decision: Option<ReviewDecision>,
    mergeable: MergeableState,
    merge_state_status: MergeStateStatus,
    head_ref_name: String,
    base_ref_name: String,
    author: Option<GraphQlActor>,
}

#[derive(Deserialize)]
struct GraphQlActor {
    login: String,
}

impl From<GraphQlPullRequest> for PullRequestDetails {
    fn from(pr: GraphQlPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            author: pr.author.map(|a| a.login).unwrap_or_default(),
            body: pr.body.filter(|b| !b.is_empty()),
            state: pr.state,
            is_draft: pr.is_draft,
            // A missing review decision means no reviews are required
            review_decision: pr.review_decision.unwrap_or(ReviewDecision::None),
            mergeable: pr.mergeable,
            merge_state_status: pr.merge_state_status,
            head_ref: pr.head_ref_name,
            base_ref: pr.base_ref_name,
            html_url: pr.url,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableAutoMergeData {
    enable_pull_request_auto_merge: EnableAutoMergePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnableAutoMergePayload {
    pull_request: AutoMergePullRequest,
}

#[derive(Deserialize)]
struct AutoMergePullRequest {
    number: u64,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (endpoints octocrab does not model)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API host for raw requests
    api_host: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        let api_host = if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
            format!("{h}/api/v3")
        } else {
            "api.github.com".to_string()
        };

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("workflow-merge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
            token: token.to_string(),
            http_client,
            api_host,
        })
    }

    async fn raw_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), url, "non-success response");
            return Ok(None);
        }

        let body: T = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to parse response: {e}")))?;
        Ok(Some(body))
    }

    /// Failing legacy commit statuses via the combined status API
    ///
    /// GitHub has two CI systems; external services report through this one.
    async fn failing_commit_statuses(&self, ref_name: &str) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct CombinedStatus {
            total_count: u32,
            statuses: Vec<CommitStatus>,
        }

        #[derive(Deserialize)]
        struct CommitStatus {
            state: String,
            context: String,
        }

        let url = format!(
            "https://{}/repos/{}/{}/commits/{}/status",
            self.api_host,
            self.config.owner,
            self.config.repo,
            urlencoding::encode(ref_name)
        );

        let Some(status) = self.raw_get::<CombinedStatus>(&url).await? else {
            // No statuses configured
            return Ok(Vec::new());
        };

        if status.total_count == 0 {
            debug!("no commit statuses configured");
            return Ok(Vec::new());
        }

        let failing: Vec<String> = status
            .statuses
            .into_iter()
            .filter(|s| matches!(s.state.as_str(), "failure" | "error"))
            .map(|s| s.context)
            .collect();

        debug!(count = failing.len(), "failing commit statuses");
        Ok(failing)
    }

    /// Failing GitHub Actions check runs
    async fn failing_check_runs(&self, ref_name: &str) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct CheckRunsResponse {
            total_count: u32,
            check_runs: Vec<CheckRun>,
        }

        #[derive(Deserialize)]
        struct CheckRun {
            name: String,
            status: String,
            conclusion: Option<String>,
        }

        let url = format!(
            "https://{}/repos/{}/{}/commits/{}/check-runs",
            self.api_host,
            self.config.owner,
            self.config.repo,
            urlencoding::encode(ref_name)
        );

        let Some(check_runs) = self.raw_get::<CheckRunsResponse>(&url).await? else {
            return Ok(Vec::new());
        };

        if check_runs.total_count == 0 {
            debug!("no check runs configured");
            return Ok(Vec::new());
        }

        let failing: Vec<String> = check_runs
            .check_runs
            .into_iter()
            .filter(|run| {
                run.status == "completed"
                    && matches!(
                        run.conclusion.as_deref(),
                        Some("failure" | "timed_out" | "cancelled" | "action_required")
                    )
            })
            .map(|run| run.name)
            .collect();

        debug!(count = failing.len(), "failing check runs");
        Ok(failing)
    }
}

#[async_trait]
impl TrackerService for GitHubService {
    async fn find_open_prs_by_head(&self, head_branch: &str) -> Result<Vec<u64>> {
        debug!(head_branch, "finding open PRs by head branch");
        let head = format!("{}:{}", &self.config.owner, head_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let numbers: Vec<u64> = prs.items.iter().map(|pr| pr.number).collect();
        debug!(count = numbers.len(), "open PRs for head branch");
        Ok(numbers)
    }

    async fn search_open_prs_mentioning(&self, issue_number: u64) -> Result<Vec<u64>> {
        #[derive(Deserialize)]
        struct SearchResponse {
            items: Vec<SearchItem>,
        }

        #[derive(Deserialize)]
        struct SearchItem {
            number: u64,
        }

        debug!(issue_number, "searching open PRs mentioning issue");
        let query = format!(
            "repo:{}/{} is:pr is:open in:title {issue_number}",
            self.config.owner, self.config.repo
        );
        let url = format!(
            "https://{}/search/issues?q={}",
            self.api_host,
            urlencoding::encode(&query)
        );

        let Some(response) = self.raw_get::<SearchResponse>(&url).await? else {
            return Ok(Vec::new());
        };

        Ok(response.items.into_iter().map(|i| i.number).collect())
    }

    async fn count_open_prs(&self) -> Result<u64> {
        #[derive(Deserialize)]
        struct SearchCount {
            total_count: u64,
        }

        let query = format!(
            "repo:{}/{} is:pr is:open",
            self.config.owner, self.config.repo
        );
        let url = format!(
            "https://{}/search/issues?q={}&per_page=1",
            self.api_host,
            urlencoding::encode(&query)
        );

        let count = self
            .raw_get::<SearchCount>(&url)
            .await?
            .map_or(0, |c| c.total_count);
        debug!(count, "open PR count");
        Ok(count)
    }

    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        debug!(pr_number, "getting PR details");

        let response: GraphQlResponse<PrDetailsData> = self
            .client
            .graphql(&serde_json::json!({
                "query": r"
                    query PullRequestDetails($owner: String!, $name: String!, $number: Int!) {
                        repository(owner: $owner, name: $name) {
                            pullRequest(number: $number) {
                                number
                                title
                                body
                                url
                                state
                                isDraft
                                reviewDecision
                                mergeable
                                mergeStateStatus
                                headRefName
                                baseRefName
                                author { login }
                            }
                        }
                    }
                ",
                "variables": {
                    "owner": self.config.owner,
                    "name": self.config.repo,
                    "number": pr_number
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL query failed: {e}")))?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }

        let details: PullRequestDetails = response
            .data
            .and_then(|d| d.repository.pull_request)
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))?
            .into();

        debug!(pr_number, state = ?details.state, "got PR details");
        Ok(details)
    }

    async fn failing_checks(&self, ref_name: &str) -> Result<Vec<String>> {
        debug!(ref_name, "checking CI status");

        let mut failing = self.failing_commit_statuses(ref_name).await?;
        failing.extend(self.failing_check_runs(ref_name).await?);

        debug!(count = failing.len(), "failing checks total");
        Ok(failing)
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        debug!(pr_number, %method, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);

        // For squash, use the PR title and body as the commit message
        let result = if method == MergeMethod::Squash {
            let details = self.pr_details(pr_number).await?;
            let mut builder = pulls.merge(pr_number).method(octocrab_method);
            builder = builder.title(format!("{} (#{})", details.title, pr_number));
            if let Some(ref body) = details.body {
                builder = builder.message(body);
            }
            builder.send().await
        } else {
            pulls.merge(pr_number).method(octocrab_method).send().await
        }
        .map_err(|e| Error::MergeFailed(e.to_string()))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    async fn enable_auto_merge(&self, pr_number: u64, method: MergeMethod) -> Result<()> {
        debug!(pr_number, %method, "enabling auto-merge");

        // Fetch PR to get node_id for the GraphQL mutation
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        let node_id = pr.node_id.as_ref().ok_or_else(|| {
            Error::GitHubApi("PR missing node_id for GraphQL mutation".to_string())
        })?;

        let merge_method = match method {
            MergeMethod::Merge => "MERGE",
            MergeMethod::Squash => "SQUASH",
            MergeMethod::Rebase => "REBASE",
        };

        let response: GraphQlResponse<EnableAutoMergeData> = self
            .client
            .graphql(&serde_json::json!({
                "query": r"
                    mutation EnableAutoMerge($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod!) {
                        enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: $mergeMethod }) {
                            pullRequest {
                                number
                            }
                        }
                    }
                ",
                "variables": {
                    "pullRequestId": node_id,
                    "mergeMethod": merge_method
                }
            }))
            .await
            .map_err(|e| Error::GitHubApi(format!("GraphQL mutation failed: {e}")))?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "could not enable auto-merge: {}",
                messages.join(", ")
            )));
        }

        let enabled = response
            .data
            .ok_or_else(|| Error::GitHubApi("No data in GraphQL response".to_string()))?;

        debug!(
            pr_number = enabled.enable_pull_request_auto_merge.pull_request.number,
            "auto-merge enabled"
        );
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting remote branch ref");

        let url = format!(
            "https://{}/repos/{}/{}/git/refs/heads/{}",
            self.api_host,
            self.config.owner,
            self.config.repo,
            urlencoding::encode(branch)
        );

        let response = self
            .http_client
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("branch delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "failed to delete branch '{branch}': HTTP {}",
                response.status()
            )));
        }

        debug!(branch, "deleted remote branch ref");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
