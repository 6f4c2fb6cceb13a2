//! Registry selecting the adapter dialect for a given base URL.
use crate::{
    client::{
        cloud::BitbucketCloud,
        config::{CLOUD_HOSTS, Credentials},
        server::BitbucketServer,
        traits::BitbucketApi,
    },
    error::{BitbucketError, Result},
};

type Matches = fn(&str) -> bool;
type Build = fn(&str, Credentials) -> Result<Box<dyn BitbucketApi>>;

/// One registered dialect: a URL predicate plus a constructor.
pub struct AdapterEntry {
    id: &'static str,
    matches: Matches,
    build: Build,
}

impl AdapterEntry {
    pub fn new(id: &'static str, matches: Matches, build: Build) -> Self {
        Self { id, matches, build }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn handles(&self, api_url: &str) -> bool {
        (self.matches)(api_url)
    }
}

fn is_cloud_url(api_url: &str) -> bool {
    CLOUD_HOSTS.iter().any(|host| api_url.starts_with(host))
}

// Anything not recognized as the multi-tenant cloud host is a self-hosted
// server reachable at an arbitrary URL.
fn is_self_hosted_url(api_url: &str) -> bool {
    !is_cloud_url(api_url)
}

fn build_cloud(
    api_url: &str,
    credentials: Credentials,
) -> Result<Box<dyn BitbucketApi>> {
    Ok(Box::new(BitbucketCloud::new(api_url, credentials)?))
}

fn build_server(
    api_url: &str,
    credentials: Credentials,
) -> Result<Box<dyn BitbucketApi>> {
    Ok(Box::new(BitbucketServer::new(api_url, credentials)?))
}

/// Ordered predicate chain over the known dialects; the first entry whose
/// predicate accepts the URL wins.
///
/// The self-hosted entry's predicate is open ("not cloud"), so it must stay
/// registered last: any dialect added after it would be unreachable.
pub struct AdapterRegistry {
    entries: Vec<AdapterEntry>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                AdapterEntry::new("cloud", is_cloud_url, build_cloud),
                AdapterEntry::new("server", is_self_hosted_url, build_server),
            ],
        }
    }
}

impl AdapterRegistry {
    /// Entry whose predicate accepts the URL, in registration order.
    pub fn resolve(&self, api_url: &str) -> Option<&AdapterEntry> {
        self.entries.iter().find(|entry| entry.handles(api_url))
    }

    /// Construct the adapter for the URL.
    pub fn create(
        &self,
        api_url: &str,
        credentials: Credentials,
    ) -> Result<Box<dyn BitbucketApi>> {
        let entry = self.resolve(api_url).ok_or_else(|| {
            BitbucketError::invalid_input(format!(
                "no adapter registered for URL: {api_url}"
            ))
        })?;
        log::debug!("resolved {api_url} to the {} dialect", entry.id);
        (entry.build)(api_url, credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_host_resolves_to_cloud_dialect() {
        let registry = AdapterRegistry::default();
        let entry = registry.resolve("https://bitbucket.org/").unwrap();
        assert_eq!(entry.id(), "cloud");

        let entry = registry.resolve("https://api.bitbucket.org/").unwrap();
        assert_eq!(entry.id(), "cloud");
    }

    #[test]
    fn test_everything_else_resolves_to_server_dialect() {
        let registry = AdapterRegistry::default();
        for url in [
            "https://bitbucket.internal.example.com/",
            "http://localhost:7990/",
            // prefix-sharing host that is not the cloud host
            "https://bitbucket.organization.example.com/",
        ] {
            let entry = registry.resolve(url).unwrap();
            assert_eq!(entry.id(), "server", "unexpected dialect for {url}");
        }
    }

    #[test]
    fn test_create_builds_a_usable_adapter() {
        let registry = AdapterRegistry::default();
        let credentials = Credentials::new("vivek", "s3cret");
        assert!(
            registry
                .create("http://localhost:7990/", credentials)
                .is_ok()
        );
    }
}
