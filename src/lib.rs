//! Async client adapter for Bitbucket hosting providers.
//!
//! Translates the paginated, authenticated REST surfaces of self-hosted
//! Bitbucket Server and bitbucket.org Cloud into one stable interface:
//! a [`BitbucketApi`] trait with typed results and a typed error taxonomy,
//! an adapter registry that picks the dialect from the base URL, and
//! transparent reassembly of file content the provider delivers in
//! line-chunked pages.
//!
//! ```rust,no_run
//! use bitbucket_client::{AdapterRegistry, BitbucketApi, Credentials};
//!
//! # async fn example() -> bitbucket_client::Result<()> {
//! let registry = AdapterRegistry::default();
//! let api = registry.create(
//!     "https://bitbucket.internal.example.com/",
//!     Credentials::new("jenkins", "app-password"),
//! )?;
//!
//! let content = api
//!     .get_content("TEST", "pipeline-demo", "Jenkinsfile", "ff06e1f")
//!     .await?;
//! # let _ = content;
//! # Ok(())
//! # }
//! ```
mod client;
mod error;

pub use client::{
    cloud::BitbucketCloud,
    config::Credentials,
    registry::{AdapterEntry, AdapterRegistry},
    server::BitbucketServer,
    traits::BitbucketApi,
    types::{
        Branch, Page, Project, Repo, SaveContentRequest, SaveContentResponse,
        User,
    },
};
pub use error::{BitbucketError, Result};
