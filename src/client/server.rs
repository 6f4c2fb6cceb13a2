//! Implements the BitbucketApi trait for self-hosted Bitbucket Server
use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap},
    multipart::Form,
};
use std::collections::HashMap;

use crate::{
    client::{
        config::{
            BROWSE_PAGE_SIZE, Credentials, DEFAULT_PROJECT_PAGE_LIMIT,
            DEFAULT_REPO_PAGE_SIZE, ensure_trailing_slash,
        },
        server::types::{BrowsePage, SavedCommit},
        traits::BitbucketApi,
        types::{
            Branch, Page, Project, Repo, SaveContentRequest,
            SaveContentResponse, User,
        },
    },
    error::{BitbucketError, Result},
};

mod types;

/// Self-hosted Bitbucket Server dialect, speaking the `rest/api/1.0`
/// surface at an arbitrary host.
///
/// The Basic-Auth header is derived once here and installed as a default
/// header on the client; the credential secret is not retained. Instances
/// are immutable after construction.
pub struct BitbucketServer {
    base_url: Url,
    client: Client,
    username: String,
}

impl BitbucketServer {
    /// Create a Server client for the given API root. The base URL is
    /// rewritten once to include the versioned REST prefix and never
    /// recomputed per call.
    pub fn new(api_url: &str, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, credentials.basic_auth_header()?);

        let client = Client::builder().default_headers(headers).build()?;

        let base_url = Url::parse(&format!(
            "{}rest/api/1.0/",
            ensure_trailing_slash(api_url)
        ))?;

        Ok(Self {
            base_url,
            client,
            username: credentials.username,
        })
    }

    fn require(value: &str, what: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(BitbucketError::invalid_input(format!(
                "{what} must not be empty"
            )));
        }
        Ok(())
    }

    /// Classify a completed response: 2xx passes through, anything else
    /// becomes a typed error carrying the status and response body.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(BitbucketError::from_status(status.as_u16(), message))
    }

    async fn send(&self, request: reqwest::Request) -> Result<Response> {
        let response = self.client.execute(request).await?;
        Self::check_status(response).await
    }

    fn repo_url(&self, project_key: &str, repo_slug: &str, rest: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!(
            "projects/{project_key}/repos/{repo_slug}/{rest}"
        ))?)
    }
}

#[async_trait]
impl BitbucketApi for BitbucketServer {
    async fn get_authenticated_user(&self) -> Result<User> {
        self.get_user(&self.username).await
    }

    async fn get_user(&self, name: &str) -> Result<User> {
        Self::require(name, "user name")?;
        let url = self.base_url.join(&format!("users/{name}"))?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let user: User = response.json().await?;
        Ok(user)
    }

    async fn list_projects(
        &self,
        start: u64,
        limit: i32,
    ) -> Result<Page<Project>> {
        let limit = if limit <= 0 {
            DEFAULT_PROJECT_PAGE_LIMIT
        } else {
            limit
        };
        let mut url = self.base_url.join("projects")?;
        url.query_pairs_mut()
            .append_pair("start", &start.to_string())
            .append_pair("limit", &limit.to_string());
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let page: Page<Project> = response.json().await?;
        Ok(page)
    }

    async fn get_project(&self, project_key: &str) -> Result<Project> {
        Self::require(project_key, "project key")?;
        let url = self.base_url.join(&format!("projects/{project_key}"))?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let project: Project = response.json().await?;
        Ok(project)
    }

    async fn list_repos(
        &self,
        project_key: &str,
        page_number: i32,
        page_size: i32,
    ) -> Result<Page<Repo>> {
        Self::require(project_key, "project key")?;
        let page_number = if page_number <= 0 { 1 } else { page_number };
        let page_size = if page_size <= 0 {
            DEFAULT_REPO_PAGE_SIZE
        } else {
            page_size
        };
        let start = page_size as u64 * (page_number as u64 - 1);

        let mut url = self
            .base_url
            .join(&format!("projects/{project_key}/repos"))?;
        url.query_pairs_mut()
            .append_pair("start", &start.to_string())
            .append_pair("limit", &page_size.to_string());
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let page: Page<Repo> = response.json().await?;
        Ok(page)
    }

    async fn get_repo(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<Repo> {
        Self::require(project_key, "project key")?;
        Self::require(repo_slug, "repo slug")?;
        let url = self.repo_url(project_key, repo_slug, "")?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let repo: Repo = response.json().await?;
        Ok(repo)
    }

    async fn get_content(
        &self,
        project_key: &str,
        repo_slug: &str,
        path: &str,
        commit_id: &str,
    ) -> Result<String> {
        Self::require(commit_id, "commit id")?;

        // The server chunks file content into bounded line windows and caps
        // the window size regardless of the requested limit, so the file is
        // reassembled with one request per window. Iterative on purpose:
        // stack depth stays flat no matter how large the file is.
        let mut lines: Vec<String> = Vec::new();
        let mut start: u64 = 0;

        loop {
            let mut url = self.repo_url(
                project_key,
                repo_slug,
                &format!("browse/{path}"),
            )?;
            url.query_pairs_mut()
                .append_pair("at", commit_id)
                .append_pair("start", &start.to_string())
                .append_pair("limit", &BROWSE_PAGE_SIZE.to_string());

            let request = self.client.get(url).build()?;
            let response = self.send(request).await?;
            let page: BrowsePage = response.json().await?;

            log::debug!(
                "browse {path} at {commit_id}: {} lines from start={start}",
                page.size
            );

            lines.extend(
                page.lines
                    .into_iter()
                    .map(|line| line.text.unwrap_or_default()),
            );

            if page.is_last_page {
                break;
            }
            start += page.size;
        }

        Ok(lines.join("\n"))
    }

    async fn save_content(
        &self,
        project_key: &str,
        repo_slug: &str,
        req: SaveContentRequest,
    ) -> Result<SaveContentResponse> {
        Self::require(&req.branch, "branch")?;

        let branch = req.branch.clone();
        let mut form = Form::new()
            .text("content", req.content)
            .text("message", req.message)
            .text("branch", req.branch);

        if let Some(source) = req.source_commit_id
            && !source.trim().is_empty()
        {
            form = form.text("sourceCommitId", source);
        }

        let url =
            self.repo_url(project_key, repo_slug, &format!("browse/{}", req.path))?;
        let request = self.client.put(url).multipart(form).build()?;
        let response = self.send(request).await?;
        let commit: SavedCommit = response.json().await?;

        Ok(SaveContentResponse {
            commit_id: commit.id,
            branch,
        })
    }

    async fn file_exists(
        &self,
        project_key: &str,
        repo_slug: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<bool> {
        let mut url =
            self.repo_url(project_key, repo_slug, &format!("browse/{path}"))?;
        if let Some(branch) = branch {
            url.query_pairs_mut()
                .append_pair("at", &format!("refs/heads/{branch}"));
        }
        let request = self.client.head(url).build()?;
        let response = self.client.execute(request).await?;
        Ok(response.status() == StatusCode::OK)
    }

    async fn get_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
        branch_name: &str,
    ) -> Result<Option<Branch>> {
        Self::require(branch_name, "branch name")?;

        let mut url = self.repo_url(project_key, repo_slug, "branches")?;
        url.query_pairs_mut().append_pair("filterText", branch_name);
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let page: Page<Branch> = response.json().await?;

        // filterText is a fuzzy prefilter; only the fully qualified ref is
        // authoritative, otherwise "main" would match "main-old".
        let expected_id = format!("refs/heads/{branch_name}");
        Ok(page.values.into_iter().find(|b| b.id == expected_id))
    }

    async fn create_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
        payload: HashMap<String, String>,
    ) -> Result<Branch> {
        for key in ["name", "startPoint"] {
            match payload.get(key) {
                Some(value) if !value.trim().is_empty() => {}
                _ => {
                    return Err(BitbucketError::invalid_input(format!(
                        "create branch payload requires a non-empty '{key}'"
                    )));
                }
            }
        }

        let url = self.repo_url(project_key, repo_slug, "branches")?;
        let request = self.client.post(url).json(&payload).build()?;
        let response = self.send(request).await?;
        let branch: Branch = response.json().await?;
        Ok(branch)
    }

    async fn get_default_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<Option<Branch>> {
        let url = self.repo_url(project_key, repo_slug, "branches/default")?;
        let request = self.client.get(url).build()?;
        let response = self.client.execute(request).await?;
        // A repository with zero commits reports 404 here. That is the
        // provider's representation of "no default branch yet", not a
        // missing resource; this is the only call that swallows a 404.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        let branch: Branch = response.json().await?;
        Ok(Some(branch))
    }

    async fn is_empty_repo(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<bool> {
        let url = self.repo_url(project_key, repo_slug, "branches/default")?;
        let request = self.client.head(url).build()?;
        let response = self.client.execute(request).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(true);
        }
        if status.is_success() {
            return Ok(false);
        }
        let message = response.text().await.unwrap_or_default();
        Err(BitbucketError::HttpStatus {
            status: status.as_u16(),
            message,
        })
    }
}
