//! Shared data types returned by every Bitbucket dialect.
//!
//! The Server dialect's camelCase wire shapes are the canonical form and
//! deserialize straight into these types; the Cloud dialect maps its own
//! envelope into them.
use serde::Deserialize;

/// One cursor window over a remote collection.
///
/// `is_last_page == true` means no further fetch is attempted; otherwise the
/// next window starts at `start + size` (the server echoes this as
/// `next_page_start`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub start: u64,
    pub limit: u64,
    pub size: u64,
    pub is_last_page: bool,
    #[serde(default)]
    pub next_page_start: Option<u64>,
    pub values: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub slug: String,
    pub name: String,
    pub project: Project,
}

/// A branch as the provider reports it. `id` is the fully qualified ref
/// (`refs/heads/<name>`); name lookups must compare against it, not against
/// `display_id`, so that `main` never matches `refs/heads/main-old`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub display_id: String,
    pub latest_commit: String,
}

/// Inputs for committing new file content to a branch.
#[derive(Debug, Clone)]
pub struct SaveContentRequest {
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: String,
    /// Expected current tip of the branch. When set, the provider rejects
    /// the save with a conflict if the branch has moved on.
    pub source_commit_id: Option<String>,
}

/// Outcome of a successful content save.
#[derive(Debug, Clone)]
pub struct SaveContentResponse {
    pub commit_id: String,
    pub branch: String,
}
