use std::path::{Path, PathBuf};
use std::time::Duration;

use config_file::FromConfigFile;
use ri_common::error::RuntimeError;
use ri_common::logger::LogLevel;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::Arguments;
use crate::git::GitRemote;
use crate::lister::{DEFAULT_IMAGE_EXTENSIONS, LinkKind};
use crate::rows::OverflowPolicy;

fn _api_base() -> Url {
    Url::parse("https://api.github.com").expect("Invalid default API base URL")
}

fn _user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn _folder_columns() -> usize {
    3
}

fn _image_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS
        .iter()
        .map(|extension| (*extension).to_string())
        .collect()
}

/// Contents of the optional YAML configuration file. Every field may be omitted.
#[derive(Debug, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default = "_api_base")]
    pub api_base: Url,
    #[serde(default = "_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "_folder_columns")]
    pub folder_columns: usize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
    #[serde(default = "_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_base: _api_base(),
            user_agent: _user_agent(),
            timeout_seconds: None,
            log_level: LogLevel::default(),
            folder_columns: _folder_columns(),
            overflow: OverflowPolicy::default(),
            image_extensions: _image_extensions(),
        }
    }
}

impl Configuration {
    pub fn load(path: Option<&Path>) -> Result<Self, RuntimeError> {
        match path {
            Some(path) => Self::from_config_file(path).map_err(|e| {
                RuntimeError::new(format!(
                    "Failed to load configuration {}: {e}",
                    path.display()
                ))
            }),
            None => Ok(Self::default()),
        }
    }
}

/// Everything a single run needs, after merging the command line over the configuration file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: Url,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub root_path: String,
    pub token: Option<String>,
    pub output: PathBuf,
    pub folder_columns: usize,
    pub overflow: OverflowPolicy,
    pub link: LinkKind,
    pub image_extensions: Vec<String>,
}

impl Settings {
    /// `detected` is the local checkout's remote, used only where the command line is silent.
    pub fn resolve(
        arguments: Arguments,
        configuration: Configuration,
        detected: Option<GitRemote>,
    ) -> Result<Self, RuntimeError> {
        let (detected_owner, detected_repo, detected_branch) = match detected {
            Some(remote) => (Some(remote.owner), Some(remote.repo), remote.branch),
            None => (None, None, None),
        };

        let owner = arguments
            .owner
            .or(detected_owner)
            .ok_or_else(|| RuntimeError::new("Repository owner is not specified"))?;
        let repo = arguments
            .repo
            .or(detected_repo)
            .ok_or_else(|| RuntimeError::new("Repository name is not specified"))?;

        let folder_columns = arguments
            .folder_columns
            .map_or(configuration.folder_columns, usize::from);
        if folder_columns == 0 {
            return Err(RuntimeError::new("folder_columns must be at least 1"));
        }

        let timeout = match configuration.timeout_seconds {
            Some(seconds) if seconds > 0.0 => {
                Some(Duration::try_from_secs_f64(seconds).map_err(|e| {
                    RuntimeError::new(format!("Invalid timeout_seconds {seconds}: {e}"))
                })?)
            }
            Some(seconds) => {
                return Err(RuntimeError::new(format!(
                    "timeout_seconds must be positive, got {seconds}"
                )));
            }
            None => None,
        };

        Ok(Self {
            api_base: configuration.api_base,
            user_agent: configuration.user_agent,
            timeout,
            owner,
            repo,
            branch: arguments.branch.or(detected_branch),
            root_path: normalize_path(&arguments.path),
            token: arguments.token.filter(|token| !token.is_empty()),
            output: arguments.output,
            folder_columns,
            overflow: arguments.overflow.unwrap_or(configuration.overflow),
            link: arguments.link,
            image_extensions: configuration.image_extensions,
        })
    }
}

/// Repository paths never start or end with a separator; `.` means the root.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
