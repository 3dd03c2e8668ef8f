//! Shared test fixtures and mocks

#![allow(dead_code)]

pub mod mock_tracker;
pub mod mock_vcs;

use workflow_merge::types::{
    MergeStateStatus, MergeableState, PlatformConfig, PrState, PullRequestDetails, ReviewDecision,
};

/// Config for a fictional test repository
pub fn test_config() -> PlatformConfig {
    PlatformConfig {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        host: None,
    }
}

/// A fully mergeable open PR: approved, no conflicts, clean merge state
pub fn mergeable_pr(number: u64, head_ref: &str) -> PullRequestDetails {
    PullRequestDetails {
        number,
        title: format!("Test PR {number}"),
        author: "dev".to_string(),
        body: Some("PR body".to_string()),
        state: PrState::Open,
        is_draft: false,
        review_decision: ReviewDecision::Approved,
        mergeable: MergeableState::Mergeable,
        merge_state_status: MergeStateStatus::Clean,
        head_ref: head_ref.to_string(),
        base_ref: "main".to_string(),
        html_url: format!("https://github.com/acme/widgets/pull/{number}"),
    }
}
