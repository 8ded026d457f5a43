use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitHubEntryType {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One item of a `GET /repos/{owner}/{repo}/contents/{path}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubDirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub url: String,
    pub html_url: Option<String>,
    pub git_url: Option<String>,
    pub download_url: Option<String>,
    #[serde(rename = "type")]
    pub type_: GitHubEntryType,
}

/// Directories answer with a list, files with a single object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GitHubContents {
    List(Vec<GitHubDirectoryEntry>),
    Single(Box<GitHubDirectoryEntry>),
}

impl GitHubContents {
    pub fn into_entries(self) -> Vec<GitHubDirectoryEntry> {
        match self {
            Self::List(entries) => entries,
            Self::Single(entry) => vec![*entry],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubErrorBody {
    #[serde(default)]
    pub message: String,
    pub documentation_url: Option<String>,
}
