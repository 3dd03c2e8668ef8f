//! Mock tracker service for testing
//!
//! Manually implements `TrackerService` (mockall struggles with methods
//! returning references). Configurable responses per PR, call tracking for
//! verification, and error injection for failure-path testing.
//!
//! `SharedMockTracker` wraps an `Arc<MockTrackerService>` so a test can keep
//! a handle for assertions after handing a boxed clone to the pipeline (the
//! orphan rule forbids implementing the trait on the `Arc` directly).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use workflow_merge::error::{Error, Result};
use workflow_merge::platform::TrackerService;
use workflow_merge::types::{MergeMethod, MergeResult, PlatformConfig, PullRequestDetails};

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub method: MergeMethod,
}

/// Mock tracker with per-PR response maps
pub struct MockTrackerService {
    config: PlatformConfig,
    // Response maps
    prs_by_head: Mutex<HashMap<String, Vec<u64>>>,
    prs_by_issue: Mutex<HashMap<u64, Vec<u64>>>,
    open_pr_count: Mutex<u64>,
    pr_details_responses: Mutex<HashMap<u64, PullRequestDetails>>,
    failing_checks_responses: Mutex<HashMap<String, Vec<String>>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    // Call tracking
    pr_details_calls: Mutex<Vec<u64>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    auto_merge_calls: Mutex<Vec<MergePrCall>>,
    delete_branch_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_merge_pr: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
}

impl MockTrackerService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            prs_by_head: Mutex::new(HashMap::new()),
            prs_by_issue: Mutex::new(HashMap::new()),
            open_pr_count: Mutex::new(0),
            pr_details_responses: Mutex::new(HashMap::new()),
            failing_checks_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            pr_details_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            auto_merge_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            error_on_merge_pr: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
        }
    }

    // === Response configuration ===

    /// Register open PR numbers for a head branch
    pub fn set_prs_by_head(&self, branch: &str, prs: Vec<u64>) {
        self.prs_by_head
            .lock()
            .unwrap()
            .insert(branch.to_string(), prs);
    }

    /// Register open PR numbers whose titles mention an issue
    pub fn set_prs_by_issue(&self, issue: u64, prs: Vec<u64>) {
        self.prs_by_issue.lock().unwrap().insert(issue, prs);
    }

    /// Set the open-PR count for `count_open_prs`
    pub fn set_open_pr_count(&self, count: u64) {
        *self.open_pr_count.lock().unwrap() = count;
    }

    /// Set the response for `pr_details` for a specific PR
    pub fn set_pr_details(&self, details: PullRequestDetails) {
        self.pr_details_responses
            .lock()
            .unwrap()
            .insert(details.number, details);
    }

    /// Set the failing check names for a ref
    pub fn set_failing_checks(&self, ref_name: &str, checks: Vec<String>) {
        self.failing_checks_responses
            .lock()
            .unwrap()
            .insert(ref_name.to_string(), checks);
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    /// Register a PR that resolves from its head branch and merges cleanly
    pub fn setup_mergeable_pr(&self, details: PullRequestDetails) {
        let number = details.number;
        self.set_prs_by_head(&details.head_ref, vec![number]);
        self.set_pr_details(details);
        self.set_merge_response(
            number,
            MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{number}")),
                message: None,
            },
        );
    }

    // === Error injection ===

    /// Make `merge_pr` return an error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification ===

    /// All PRs `pr_details` was called for
    pub fn pr_details_calls(&self) -> Vec<u64> {
        self.pr_details_calls.lock().unwrap().clone()
    }

    /// All `merge_pr` calls
    pub fn merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// All `enable_auto_merge` calls
    pub fn auto_merge_calls(&self) -> Vec<MergePrCall> {
        self.auto_merge_calls.lock().unwrap().clone()
    }

    /// All branches `delete_branch` was called with
    pub fn delete_branch_calls(&self) -> Vec<String> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    /// Assert `merge_pr` was called for a specific PR
    pub fn assert_merge_called(&self, pr_number: u64) {
        let calls = self.merge_pr_calls();
        assert!(
            calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) but got: {calls:?}"
        );
    }

    /// Assert `merge_pr` was never called
    pub fn assert_merge_not_called(&self) {
        let calls = self.merge_pr_calls();
        assert!(
            calls.is_empty(),
            "Expected no merge_pr calls but got: {calls:?}"
        );
    }

    /// Assert `delete_branch` was never called
    pub fn assert_delete_branch_not_called(&self) {
        let calls = self.delete_branch_calls();
        assert!(
            calls.is_empty(),
            "Expected no delete_branch calls but got: {calls:?}"
        );
    }
}

#[async_trait]
impl TrackerService for MockTrackerService {
    async fn find_open_prs_by_head(&self, head_branch: &str) -> Result<Vec<u64>> {
        let responses = self.prs_by_head.lock().unwrap();
        Ok(responses.get(head_branch).cloned().unwrap_or_default())
    }

    async fn search_open_prs_mentioning(&self, issue_number: u64) -> Result<Vec<u64>> {
        let responses = self.prs_by_issue.lock().unwrap();
        Ok(responses.get(&issue_number).cloned().unwrap_or_default())
    }

    async fn count_open_prs(&self) -> Result<u64> {
        Ok(*self.open_pr_count.lock().unwrap())
    }

    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        self.pr_details_calls.lock().unwrap().push(pr_number);

        let responses = self.pr_details_responses.lock().unwrap();
        responses.get(&pr_number).cloned().ok_or_else(|| {
            Error::GitHubApi(format!(
                "pr_details: no response configured for PR #{pr_number}"
            ))
        })
    }

    async fn failing_checks(&self, ref_name: &str) -> Result<Vec<String>> {
        let responses = self.failing_checks_responses.lock().unwrap();
        Ok(responses.get(ref_name).cloned().unwrap_or_default())
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.merge_pr_calls
            .lock()
            .unwrap()
            .push(MergePrCall { pr_number, method });

        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let responses = self.merge_responses.lock().unwrap();
        responses.get(&pr_number).cloned().ok_or_else(|| {
            Error::GitHubApi(format!(
                "merge_pr: no response configured for PR #{pr_number}"
            ))
        })
    }

    async fn enable_auto_merge(&self, pr_number: u64, method: MergeMethod) -> Result<()> {
        self.auto_merge_calls
            .lock()
            .unwrap()
            .push(MergePrCall { pr_number, method });
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.delete_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_delete_branch.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// Boxable handle to a shared `MockTrackerService`, delegating every call to
/// the inner `Arc` so the test keeps a handle for assertions
pub struct SharedMockTracker(pub Arc<MockTrackerService>);

#[async_trait]
impl TrackerService for SharedMockTracker {
    async fn find_open_prs_by_head(&self, head_branch: &str) -> Result<Vec<u64>> {
        self.0.find_open_prs_by_head(head_branch).await
    }

    async fn search_open_prs_mentioning(&self, issue_number: u64) -> Result<Vec<u64>> {
        self.0.search_open_prs_mentioning(issue_number).await
    }

    async fn count_open_prs(&self) -> Result<u64> {
        self.0.count_open_prs().await
    }

    async fn pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        self.0.pr_details(pr_number).await
    }

    async fn failing_checks(&self, ref_name: &str) -> Result<Vec<String>> {
        self.0.failing_checks(ref_name).await
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.0.merge_pr(pr_number, method).await
    }

    async fn enable_auto_merge(&self, pr_number: u64, method: MergeMethod) -> Result<()> {
        self.0.enable_auto_merge(pr_number, method).await
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.0.delete_branch(branch).await
    }

    fn config(&self) -> &PlatformConfig {
        self.0.config()
    }
}
