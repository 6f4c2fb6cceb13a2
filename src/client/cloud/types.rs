use serde::Deserialize;

/// Cloud's cursor envelope: page-number based, with a `next` link instead of
/// an explicit last-page flag.
#[derive(Debug, Deserialize)]
pub struct PagedEnvelope<T> {
    pub pagelen: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    pub values: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct CloudUser {
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct Workspace {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudRepo {
    pub slug: String,
    pub name: String,
    pub workspace: Workspace,
    #[serde(default)]
    pub mainbranch: Option<CloudRefName>,
}

/// Branch reference as embedded in a repository record: name only, no tip.
#[derive(Debug, Deserialize)]
pub struct CloudRefName {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CloudRef {
    pub name: String,
    pub target: CloudRefTarget,
}

#[derive(Debug, Deserialize)]
pub struct CloudRefTarget {
    pub hash: String,
}
