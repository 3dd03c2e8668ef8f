//! workflow-merge - merge a pull request and clean up its worktree
//!
//! One command takes a reviewed PR from "approved" to "gone": it resolves
//! which PR the current branch belongs to, validates merge readiness in
//! aggregate, guards against losing uncommitted work, merges through the
//! tracker API, and then removes the local worktree before deleting the
//! remote branch. The branch is deleted only after its worktree is confirmed
//! gone, so an interrupted cleanup always leaves a recoverable state.

pub mod auth;
pub mod cache;
pub mod cleanup;
pub mod cli;
pub mod error;
pub mod git;
pub mod guard;
pub mod platform;
pub mod resolve;
pub mod status;
pub mod types;
pub mod validate;
