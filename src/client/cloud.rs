//! Implements the BitbucketApi trait for bitbucket.org (the 2.0 API)
use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap},
    multipart::Form,
};
use std::collections::HashMap;

use crate::{
    client::{
        cloud::types::{CloudRef, CloudRepo, CloudUser, PagedEnvelope, Workspace},
        config::{Credentials, ensure_trailing_slash},
        traits::BitbucketApi,
        types::{
            Branch, Page, Project, Repo, SaveContentRequest,
            SaveContentResponse, User,
        },
    },
    error::{BitbucketError, Result},
};

mod types;

/// Cloud's maximum (and our fallback) page length.
const CLOUD_PAGE_LEN: i32 = 100;

/// Multi-tenant bitbucket.org dialect. Workspaces stand in for projects and
/// file content comes back whole from the raw `src` endpoint, so no
/// line-chunk reassembly is needed in this dialect.
pub struct BitbucketCloud {
    base_url: Url,
    client: Client,
    username: String,
}

impl BitbucketCloud {
    pub fn new(api_url: &str, credentials: Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, credentials.basic_auth_header()?);

        let client = Client::builder().default_headers(headers).build()?;

        let base_url =
            Url::parse(&format!("{}2.0/", ensure_trailing_slash(api_url)))?;

        Ok(Self {
            base_url,
            client,
            username: credentials.username,
        })
    }

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

    fn repo_url(&self, workspace: &str, repo_slug: &str, rest: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!(
            "repositories/{workspace}/{repo_slug}/{rest}"
        ))?)
    }

    /// Flatten cloud's page-number envelope into the common offset-based
    /// page shape.
    fn normalize_page<T, U>(
        envelope: PagedEnvelope<T>,
        map: impl Fn(T) -> U,
    ) -> Page<U> {
        let page_number = envelope.page.unwrap_or(1).max(1);
        let start = envelope.pagelen * (page_number - 1);
        let values: Vec<U> = envelope.values.into_iter().map(map).collect();
        let size = values.len() as u64;
        let is_last_page = envelope.next.is_none();
        Page {
            start,
            limit: envelope.pagelen,
            size,
            is_last_page,
            next_page_start: if is_last_page {
                None
            } else {
                Some(start + size)
            },
            values,
        }
    }

    fn to_user(user: CloudUser) -> User {
        User {
            name: user.username,
            display_name: user.display_name,
            email_address: None,
        }
    }

    fn to_project(workspace: Workspace) -> Project {
        Project {
            key: workspace.slug,
            name: workspace.name,
            description: None,
        }
    }

    fn to_repo(repo: CloudRepo) -> Repo {
        Repo {
            slug: repo.slug,
            name: repo.name,
            project: Self::to_project(repo.workspace),
        }
    }

    fn to_branch(branch: CloudRef) -> Branch {
        Branch {
            id: format!("refs/heads/{}", branch.name),
            display_id: branch.name,
            latest_commit: branch.target.hash,
        }
    }
}

#[async_trait]
impl BitbucketApi for BitbucketCloud {
    async fn get_authenticated_user(&self) -> Result<User> {
        self.get_user(&self.username).await
    }

    async fn get_user(&self, name: &str) -> Result<User> {
        if name.trim().is_empty() {
            return Err(BitbucketError::invalid_input(
                "user name must not be empty",
            ));
        }
        let url = self.base_url.join(&format!("users/{name}"))?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let user: CloudUser = response.json().await?;
        Ok(Self::to_user(user))
    }

    async fn list_projects(
        &self,
        start: u64,
        limit: i32,
    ) -> Result<Page<Project>> {
        let limit = if limit <= 0 { CLOUD_PAGE_LEN } else { limit };
        let page_number = start / limit as u64 + 1;

        let mut url = self.base_url.join("workspaces")?;
        url.query_pairs_mut()
            .append_pair("page", &page_number.to_string())
            .append_pair("pagelen", &limit.to_string());
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let envelope: PagedEnvelope<Workspace> = response.json().await?;
        Ok(Self::normalize_page(envelope, Self::to_project))
    }

    async fn get_project(&self, project_key: &str) -> Result<Project> {
        if project_key.trim().is_empty() {
            return Err(BitbucketError::invalid_input(
                "project key must not be empty",
            ));
        }
        let url = self.base_url.join(&format!("workspaces/{project_key}"))?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let workspace: Workspace = response.json().await?;
        Ok(Self::to_project(workspace))
    }

    async fn list_repos(
        &self,
        project_key: &str,
        page_number: i32,
        page_size: i32,
    ) -> Result<Page<Repo>> {
        let page_number = if page_number <= 0 { 1 } else { page_number };
        let page_size = if page_size <= 0 {
            CLOUD_PAGE_LEN
        } else {
            page_size
        };

        let mut url = self
            .base_url
            .join(&format!("repositories/{project_key}"))?;
        url.query_pairs_mut()
            .append_pair("page", &page_number.to_string())
            .append_pair("pagelen", &page_size.to_string());
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let envelope: PagedEnvelope<CloudRepo> = response.json().await?;
        Ok(Self::normalize_page(envelope, Self::to_repo))
    }

    async fn get_repo(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<Repo> {
        let url = self.repo_url(project_key, repo_slug, "")?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let repo: CloudRepo = response.json().await?;
        Ok(Self::to_repo(repo))
    }

    async fn get_content(
        &self,
        project_key: &str,
        repo_slug: &str,
        path: &str,
        commit_id: &str,
    ) -> Result<String> {
        if commit_id.trim().is_empty() {
            return Err(BitbucketError::invalid_input(
                "commit id must not be empty",
            ));
        }
        // Cloud serves the whole file raw in one response; the server
        // dialect is the one that chunks content into line windows.
        let url = self.repo_url(
            project_key,
            repo_slug,
            &format!("src/{commit_id}/{path}"),
        )?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        Ok(response.text().await?)
    }

    async fn save_content(
        &self,
        project_key: &str,
        repo_slug: &str,
        req: SaveContentRequest,
    ) -> Result<SaveContentResponse> {
        if req.branch.trim().is_empty() {
            return Err(BitbucketError::invalid_input(
                "branch must not be empty",
            ));
        }

        let branch = req.branch.clone();
        let mut form = Form::new()
            .text(req.path, req.content)
            .text("message", req.message)
            .text("branch", req.branch);

        if let Some(source) = req.source_commit_id
            && !source.trim().is_empty()
        {
            form = form.text("parents", source);
        }

        let url = self.repo_url(project_key, repo_slug, "src")?;
        let request = self.client.post(url).multipart(form).build()?;
        let response = self.client.execute(request).await?;
        Self::check_status(response).await?;

        // The src endpoint does not echo the created commit, so read the
        // branch tip back for the new id.
        let tip = self
            .get_branch(project_key, repo_slug, &branch)
            .await?
            .ok_or_else(|| {
                BitbucketError::unexpected(format!(
                    "branch {branch} missing after content save"
                ))
            })?;

        Ok(SaveContentResponse {
            commit_id: tip.latest_commit,
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
        let revision = branch.unwrap_or("HEAD");
        let mut url = self.repo_url(
            project_key,
            repo_slug,
            &format!("src/{revision}/{path}"),
        )?;
        url.query_pairs_mut().append_pair("format", "meta");
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
        if branch_name.trim().is_empty() {
            return Err(BitbucketError::invalid_input(
                "branch name must not be empty",
            ));
        }
        let url = self.repo_url(
            project_key,
            repo_slug,
            &format!("refs/branches/{branch_name}"),
        )?;
        let request = self.client.get(url).build()?;
        let response = self.client.execute(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        let branch: CloudRef = response.json().await?;
        Ok(Some(Self::to_branch(branch)))
    }

    async fn create_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
        payload: HashMap<String, String>,
    ) -> Result<Branch> {
        let mut fields = HashMap::new();
        for key in ["name", "startPoint"] {
            match payload.get(key) {
                Some(value) if !value.trim().is_empty() => {
                    fields.insert(key, value.clone());
                }
                _ => {
                    return Err(BitbucketError::invalid_input(format!(
                        "create branch payload requires a non-empty '{key}'"
                    )));
                }
            }
        }

        let body = serde_json::json!({
            "name": fields["name"],
            "target": { "hash": fields["startPoint"] },
        });

        let url = self.repo_url(project_key, repo_slug, "refs/branches")?;
        let request = self.client.post(url).json(&body).build()?;
        let response = self.send(request).await?;
        let branch: CloudRef = response.json().await?;
        Ok(Self::to_branch(branch))
    }

    async fn get_default_branch(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<Option<Branch>> {
        let url = self.repo_url(project_key, repo_slug, "")?;
        let request = self.client.get(url).build()?;
        let response = self.send(request).await?;
        let repo: CloudRepo = response.json().await?;

        // Cloud models an empty repository as a null mainbranch rather than
        // a 404 probe; both normalize to the same absent result.
        let Some(mainbranch) = repo.mainbranch else {
            return Ok(None);
        };
        self.get_branch(project_key, repo_slug, &mainbranch.name)
            .await
    }

    async fn is_empty_repo(
        &self,
        project_key: &str,
        repo_slug: &str,
    ) -> Result<bool> {
        let branch = self.get_default_branch(project_key, repo_slug).await?;
        Ok(branch.is_none())
    }
}
