//! Error types exposed by the GitLab client layer.

use thiserror::Error;

use crate::deferred::Unwound;

/// Errors surfaced while parsing input, talking to GitLab, or validating
/// responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// No merge request was named by URL or by project and IID.
    #[error("a merge request URL or a project and IID are required")]
    MissingMergeRequest,

    /// The provided URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The merge request path is incomplete.
    #[error("merge request URL must match /<namespace>/<project>/-/merge_requests/<iid>")]
    MissingPathSegments,

    /// The project path is empty or contains empty segments.
    #[error("project path is invalid: {path:?}")]
    InvalidProjectPath {
        /// The rejected project path.
        path: String,
    },

    /// The merge request IID is not a positive integer.
    #[error("merge request IID must be a positive integer")]
    InvalidMergeRequestIid,

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The authentication token was rejected by GitLab.
    #[error("GitLab rejected the token: {message}")]
    Authentication {
        /// GitLab error message returned with the 401/403 response.
        message: String,
    },

    /// GitLab throttled the request.
    #[error("GitLab API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Seconds to wait, from the `Retry-After` header when present.
        retry_after_seconds: Option<u64>,
        /// Error message from GitLab.
        message: String,
    },

    /// GitLab returned a non-authentication API error.
    #[error("GitLab API error: {message}")]
    Api {
        /// Response body from GitLab describing the failure.
        message: String,
    },

    /// Networking failed while calling GitLab.
    #[error("network error talking to GitLab: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The response body was not the JSON document that was expected.
    #[error("unexpected GitLab response: {message}")]
    Decode {
        /// Details about the decoding failure.
        message: String,
    },

    /// The response failed its shape check.
    #[error("{message}")]
    Validation {
        /// Fixed description configured for the failing check.
        message: String,
    },

    /// A pipeline step panicked and the panic was caught.
    #[error("request pipeline panicked: {message}")]
    Panicked {
        /// The panic message.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}

impl From<Unwound> for ClientError {
    fn from(value: Unwound) -> Self {
        Self::Panicked {
            message: value.message().to_owned(),
        }
    }
}
