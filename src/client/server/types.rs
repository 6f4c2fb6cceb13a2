use serde::Deserialize;

/// One line record from the paged browse endpoint. The provider omits the
/// text field for blank lines; that maps to an empty line, never a failure.
#[derive(Debug, Deserialize)]
pub struct BrowseLine {
    #[serde(default)]
    pub text: Option<String>,
}

/// One window of a file's content from `browse/{path}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePage {
    pub lines: Vec<BrowseLine>,
    pub size: u64,
    pub is_last_page: bool,
}

/// Commit record echoed by the multipart content save.
#[derive(Debug, Deserialize)]
pub struct SavedCommit {
    pub id: String,
}
