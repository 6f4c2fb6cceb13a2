//! Common trait implemented by every Bitbucket dialect.
use async_trait::async_trait;
use std::collections::HashMap;

use crate::{
    client::types::{
        Branch, Page, Project, Repo, SaveContentRequest, SaveContentResponse,
        User,
    },
    error::Result,
};

/// Operation set shared by the Server and Cloud dialects.
///
/// Implementations are immutable after construction and take `&self`
/// everywhere, so a single boxed instance is safe to share across tasks
/// without synchronization. No operation retries internally; failures are
/// classified into [`crate::BitbucketError`] and propagated.
#[async_trait]
pub trait BitbucketApi: Send + Sync {
    /// User record for the principal the adapter was constructed with.
    async fn get_authenticated_user(&self) -> Result<User>;

    async fn get_user(&self, name: &str) -> Result<User>;

    /// One page of projects. A non-positive `limit` falls back to the
    /// provider default.
    async fn list_projects(&self, start: u64, limit: i32)
    -> Result<Page<Project>>;

    async fn get_project(&self, project_key: &str) -> Result<Project>;

    /// One page of repositories. `page_number <= 0` reads as 1 and
    /// `page_size <= 0` as the provider maximum; the request offset is
    /// `page_size * (page_number - 1)`.
    async fn list_repos(
        &self,
        project_key: &str,
        page_number: i32,
        page_size: i32,
    ) -> Result<Page<Repo>>;

    async fn get_repo(&self, project_key: &str, repo_slug: &str)
    -> Result<Repo>;

    /// Full file content at an exact commit, reassembled across however many
    /// pages the provider chunks it into.
    async fn get_content(
        &self,
        project_key: &str,
        repo_slug: &str,
        path: &str,
        commit_id: &str,
    ) -> Result<String>;

    /// Commit new file content to a branch. A stale `source_commit_id`
    /// surfaces as a 409 `HttpStatus` error.
    async fn save_content(
        &self,
        project_key: &str,
        repo_slug: &str,
        req: SaveContentRequest,
    ) -> Result<SaveContentResponse>;

    /// Whether `path` exists, optionally pinned to a branch. Transport
    /// failures still error; a completed non-200 probe is just `false`.
    async fn file_exists(
        &self,
        project_key: &str,
        repo_slug: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<bool>;

    /// Look up a branch by bare name. The provider-side text filter is only
    /// a prefilter; the result is matched exactly on `refs/heads/<name>`.
    /// Absence is a valid outcome, not an error.
    async fn get_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
        branch_name: &str,
    ) -> Result<Option<Branch>>;

    /// Create a branch from a provider-defined payload map. `name` and
    /// `startPoint` are required and validated before any request is sent.
    async fn create_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
        payload: HashMap<String, String>,
    ) -> Result<Branch>;

    /// Default branch of the repository, or `None` when the repository has
    /// zero commits. The provider reports the empty case as a 404, which is
    /// deliberately not an error here and nowhere else.
    async fn get_default_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<Option<Branch>>;

    /// True iff the default-branch probe reports the repository as empty.
    async fn is_empty_repo(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<bool>;
}
