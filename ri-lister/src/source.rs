use async_trait::async_trait;
use chrono::DateTime;
use log::{debug, trace};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use ri_common::error::{ListingError, ListingErrorKind, RuntimeError};
use ri_common::schema::github::{GitHubContents, GitHubDirectoryEntry, GitHubErrorBody};
use url::Url;

use crate::configuration::Settings;
use crate::http::HttpClient;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// The contents API silently cuts directory listings off at this many entries.
pub const CONTENTS_LISTING_LIMIT: usize = 1000;

/// Lists one directory of a remote repository.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Entries of `path` (relative to the repository root, `""` for the root) in listing order.
    async fn list(&self, path: &str) -> Result<Vec<GitHubDirectoryEntry>, ListingError>;
}

/// Map a failed contents API response to an error kind.
///
/// GitHub reports an exhausted primary quota as 403 with `x-ratelimit-remaining: 0`,
/// and secondary limits as 403 or 429 with a "rate limit" message.
pub fn classify_status(
    status: StatusCode,
    rate_limit_remaining: Option<&str>,
    message: &str,
) -> ListingErrorKind {
    match status {
        StatusCode::NOT_FOUND => ListingErrorKind::NotFound,
        StatusCode::UNAUTHORIZED => ListingErrorKind::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => ListingErrorKind::RateLimited,
        StatusCode::FORBIDDEN => {
            if rate_limit_remaining.map(str::trim) == Some("0")
                || message.to_lowercase().contains("rate limit")
            {
                ListingErrorKind::RateLimited
            } else {
                ListingErrorKind::Unauthorized
            }
        }
        _ => ListingErrorKind::TransientNetworkError,
    }
}

fn _header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn _rate_limit_hint(headers: &HeaderMap) -> Option<String> {
    if let Some(reset) = _header(headers, RATE_LIMIT_RESET)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    {
        return Some(format!(
            "limit resets at {}",
            reset.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    _header(headers, RETRY_AFTER.as_str()).map(|seconds| format!("retry after {seconds}s"))
}

pub struct GitHubSource {
    _http: HttpClient,
    _api_base: Url,
    _owner: String,
    _repo: String,
    _branch: Option<String>,
}

impl GitHubSource {
    pub fn new(http: HttpClient, settings: &Settings) -> Result<Self, RuntimeError> {
        if settings.api_base.cannot_be_a_base() {
            return Err(RuntimeError::new(format!(
                "Invalid API base URL {}",
                settings.api_base
            )));
        }

        Ok(Self {
            _http: http,
            _api_base: settings.api_base.clone(),
            _owner: settings.owner.clone(),
            _repo: settings.repo.clone(),
            _branch: settings.branch.clone(),
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/contents/{path}[?ref={branch}]`, percent-encoded.
    pub fn contents_url(&self, path: &str) -> Result<Url, ListingError> {
        let mut url = self._api_base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ListingError::new(
                    ListingErrorKind::TransientNetworkError,
                    path,
                    format!("cannot build a request URL from {}", self._api_base),
                )
            })?
            .pop_if_empty()
            .extend(["repos", self._owner.as_str(), self._repo.as_str(), "contents"])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        if let Some(branch) = &self._branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        Ok(url)
    }
}

#[async_trait]
impl ListingSource for GitHubSource {
    async fn list(&self, path: &str) -> Result<Vec<GitHubDirectoryEntry>, ListingError> {
        let url = self.contents_url(path)?;
        debug!("GET {url}");

        let response = self._http.get(url).send().await.map_err(|e| {
            ListingError::new(ListingErrorKind::TransientNetworkError, path, e.to_string())
        })?;

        let status = response.status();
        trace!("HTTP {status} for \"{path}\"");

        if status.is_success() {
            let contents = response.json::<GitHubContents>().await.map_err(|e| {
                ListingError::new(
                    ListingErrorKind::TransientNetworkError,
                    path,
                    format!("invalid response body: {e}"),
                )
            })?;

            let entries = contents.into_entries();
            if entries.len() >= CONTENTS_LISTING_LIMIT {
                return Err(ListingError::new(
                    ListingErrorKind::TruncatedListing,
                    path,
                    format!(
                        "directory has {CONTENTS_LISTING_LIMIT} or more entries, the contents API does not return the rest"
                    ),
                ));
            }

            return Ok(entries);
        }

        let headers = response.headers().clone();
        let body = response.json::<GitHubErrorBody>().await.unwrap_or_default();
        let kind = classify_status(status, _header(&headers, RATE_LIMIT_REMAINING), &body.message);

        let mut detail = format!("HTTP {status}");
        if !body.message.is_empty() {
            detail.push_str(&format!(": {}", body.message));
        }
        if kind == ListingErrorKind::RateLimited {
            if let Some(hint) = _rate_limit_hint(&headers) {
                detail.push_str(&format!(" ({hint})"));
            }
            if !self._http.is_authenticated() {
                detail.push_str(", pass --token to raise the limit");
            }
        }

        Err(ListingError::new(kind, path, detail))
    }
}
