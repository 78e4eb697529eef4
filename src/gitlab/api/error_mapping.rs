//! Error mapping helpers for the reqwest-backed GitLab client.

use http::StatusCode;
use http::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

use crate::gitlab::error::ClientError;

/// Checks if a status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Reads the delay from a numeric `Retry-After` header.
pub(super) fn retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

/// Extracts GitLab's error description from a response body.
///
/// GitLab reports failures as `{"message": ...}` or `{"error": ...}`; the
/// message may itself be an object of field errors, which is rendered as
/// JSON.
pub(super) fn extract_gitlab_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return None;
    };
    let detail = value.get("message").or_else(|| value.get("error"))?;
    match detail {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    headers: &HeaderMap,
    maybe_message: Option<String>,
) -> ClientError {
    let message = maybe_message.unwrap_or_else(|| "unknown error".to_owned());
    if is_auth_failure(status) {
        ClientError::Authentication {
            message: format!("{operation} failed: GitLab returned {status} {message}"),
        }
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ClientError::RateLimitExceeded {
            retry_after_seconds: retry_after_seconds(headers),
            message: format!("{operation} failed: {message}"),
        }
    } else {
        ClientError::Api {
            message: format!("{operation} failed with status {status}: {message}"),
        }
    }
}

pub(super) fn map_reqwest_error(operation: &str, error: &reqwest::Error) -> ClientError {
    if error.is_connect() || error.is_timeout() || error.is_request() {
        return ClientError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    if error.is_decode() || error.is_body() {
        return ClientError::Decode {
            message: format!("{operation} response could not be read: {error}"),
        };
    }

    ClientError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use http::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use http::StatusCode;
    use rstest::rstest;

    use super::{extract_gitlab_message, map_http_error};
    use crate::gitlab::error::ClientError;

    #[rstest]
    #[case::message(r#"{"message": "401 Unauthorized"}"#, Some("401 Unauthorized"))]
    #[case::error(r#"{"error": "insufficient_scope"}"#, Some("insufficient_scope"))]
    #[case::field_errors(r#"{"message": {"title": ["is missing"]}}"#, Some(r#"{"title":["is missing"]}"#))]
    #[case::not_json("<html>bad gateway</html>", None)]
    fn extracts_gitlab_messages(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_gitlab_message(body).as_deref(), expected);
    }

    #[rstest]
    fn too_many_requests_carries_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));

        let error = map_http_error(
            "current user",
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            Some("Retry later".to_owned()),
        );

        assert_eq!(
            error,
            ClientError::RateLimitExceeded {
                retry_after_seconds: Some(30),
                message: "current user failed: Retry later".to_owned(),
            }
        );
    }

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED)]
    #[case::forbidden(StatusCode::FORBIDDEN)]
    fn auth_statuses_map_to_authentication(#[case] status: StatusCode) {
        let error = map_http_error("merge request", status, &HeaderMap::new(), None);
        assert!(
            matches!(error, ClientError::Authentication { .. }),
            "expected Authentication, got {error:?}"
        );
    }
}
