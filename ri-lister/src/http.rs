use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{IntoUrl, RequestBuilder};
use ri_common::error::RuntimeError;

use crate::configuration::Settings;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug)]
pub struct HttpClient {
    _client: reqwest::Client,
    _token: Option<String>,
}

impl HttpClient {
    pub fn new(settings: &Settings) -> Result<Self, RuntimeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| RuntimeError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            _client: client,
            _token: settings.token.clone(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self._token.is_some()
    }

    /// A GET request carrying the bearer token, if any.
    pub fn get<U>(&self, url: U) -> RequestBuilder
    where
        U: IntoUrl,
    {
        let request = self._client.get(url);
        match &self._token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
