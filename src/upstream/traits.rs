//! Traits related to upstream release sources
use async_trait::async_trait;

use crate::upstream::types::{Release, RepoComparison};

/// Source of upstream releases. Implementations log failures and return
/// `None`/empty rather than erroring.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn fetch_latest_release(&self) -> Option<Release>;
    async fn fetch_all_releases(&self) -> Vec<Release>;
    async fn fetch_repo_changes(&self, tag: &str) -> Option<RepoComparison>;
    async fn fetch_readme_content(&self) -> Option<String>;
}
