//! reqwest implementation of [`GitLabApi`].

use async_trait::async_trait;
use http::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::gitlab::error::ClientError;
use crate::gitlab::locator::{Credentials, MergeRequestLocator};

use super::GitLabApi;
use super::error_mapping::{extract_gitlab_message, map_http_error, map_reqwest_error};

const PRIVATE_TOKEN: &str = "private-token";
const USER_AGENT: &str = concat!("tanuki/", env!("CARGO_PKG_VERSION"));

/// GitLab REST v4 client authenticated with a personal access token.
#[derive(Debug, Clone)]
pub struct ReqwestGitLabApi {
    http: reqwest::Client,
    api_base: Url,
}

impl ReqwestGitLabApi {
    /// Builds a client for the host and token in `credentials`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` when the API base cannot be derived,
    /// `ClientError::Configuration` when the token is not a valid header
    /// value, and `ClientError::Api` when reqwest fails to build a client.
    pub fn new(credentials: &Credentials) -> Result<Self, ClientError> {
        let mut token = HeaderValue::from_str(credentials.token().value()).map_err(|error| {
            ClientError::Configuration {
                message: format!("token is not a valid header value: {error}"),
            }
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(PRIVATE_TOKEN), token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| ClientError::Api {
                message: format!("build client failed: {error}"),
            })?;

        Ok(Self {
            http,
            api_base: credentials.api_base()?,
        })
    }

    /// REST API base URL the client sends requests to.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    async fn get_json(&self, operation: &str, path: &str) -> Result<Value, ClientError> {
        let url = self
            .api_base
            .join(path)
            .map_err(|error| ClientError::InvalidUrl(error.to_string()))?;

        tracing::debug!(%url, operation, "sending GitLab request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| map_reqwest_error(operation, &error))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|error| map_reqwest_error(operation, &error))?;

        if !status.is_success() {
            tracing::debug!(operation, %status, "GitLab request failed");
            return Err(map_http_error(
                operation,
                status,
                &headers,
                extract_gitlab_message(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|error| ClientError::Decode {
            message: format!("{operation} response is not JSON: {error}"),
        })
    }
}

#[async_trait]
impl GitLabApi for ReqwestGitLabApi {
    async fn current_user(&self) -> Result<Value, ClientError> {
        self.get_json("current user", "user").await
    }

    async fn merge_request(&self, locator: &MergeRequestLocator) -> Result<Value, ClientError> {
        self.get_json("merge request", &locator.merge_request_path())
            .await
    }

    async fn merge_request_changes(
        &self,
        locator: &MergeRequestLocator,
    ) -> Result<Value, ClientError> {
        self.get_json("merge request changes", &locator.changes_path())
            .await
    }
}
