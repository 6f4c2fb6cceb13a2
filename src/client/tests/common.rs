use crate::client::{
    cloud::BitbucketCloud, config::Credentials, server::BitbucketServer,
};

/// Basic header derived from the fixture credentials below.
pub const FIXTURE_AUTH: &str = "Basic dml2ZWs6czNjcmV0";

pub fn fixture_credentials() -> Credentials {
    Credentials::new("vivek", "s3cret")
}

pub fn server_client(api_url: &str) -> BitbucketServer {
    BitbucketServer::new(api_url, fixture_credentials()).unwrap()
}

pub fn cloud_client(api_url: &str) -> BitbucketCloud {
    BitbucketCloud::new(api_url, fixture_credentials()).unwrap()
}
