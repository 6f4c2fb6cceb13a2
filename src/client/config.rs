//! Credentials and connection constants for Bitbucket providers.
use base64::{Engine, prelude::BASE64_STANDARD};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Result;

/// Default page limit the server applies to project listings.
pub const DEFAULT_PROJECT_PAGE_LIMIT: i32 = 25;
/// Maximum page size the server allows for repository listings; also the
/// default when the caller passes a non-positive size.
pub const DEFAULT_REPO_PAGE_SIZE: i32 = 500;
/// Line-chunk size for the server's paged file browse endpoint. The server
/// enforces this cap regardless of the requested limit, which is why content
/// reads must walk pages instead of asking for one oversized window.
pub const BROWSE_PAGE_SIZE: u64 = 500;
/// Fixed host prefixes recognized as the cloud dialect.
pub const CLOUD_HOSTS: [&str; 2] =
    ["https://bitbucket.org/", "https://api.bitbucket.org/"];

/// Username plus opaque secret for authenticating against a provider.
///
/// The secret is held only long enough to derive the Basic-Auth header at
/// adapter construction; adapters retain the derived header, never the
/// secret itself.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub secret: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Derive the `Basic base64(username:secret)` header value, marked
    /// sensitive so it is redacted from header debug output.
    pub fn basic_auth_header(&self) -> Result<HeaderValue> {
        let raw =
            format!("{}:{}", self.username, self.secret.expose_secret());
        let encoded = format!("Basic {}", BASE64_STANDARD.encode(raw));
        let mut value = HeaderValue::from_str(&encoded)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Normalize a base URL so joins against it treat the last segment as a
/// directory.
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
