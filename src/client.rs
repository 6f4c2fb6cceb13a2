//! Unified client interface for Bitbucket hosting dialects (Server, Cloud).
//!
//! Provides Basic-Auth authentication, paginated resource reconstruction,
//! and a typed error taxonomy behind one trait, with the concrete dialect
//! chosen at runtime from the base URL.

/// Credentials and connection constants.
pub mod config;

/// bitbucket.org multi-tenant API client implementation.
pub mod cloud;

/// Adapter selection by base URL.
pub mod registry;

/// Self-hosted Bitbucket Server API client implementation.
pub mod server;

/// Common trait for dialect abstraction.
pub mod traits;

/// Shared data types for users, projects, repos, branches, and pages.
pub mod types;
