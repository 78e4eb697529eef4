//! GitLab merge request access through deferred pipelines.
//!
//! [`api`] performs the HTTP calls and hands back raw JSON. [`client`] wraps
//! each call in a [`Deferred`](crate::deferred::Deferred) pipeline that logs
//! the raw response, checks its shape, and decodes a typed record. Errors are
//! reported as [`ClientError`] values, never as panics.

pub mod api;
pub mod client;
pub mod error;
pub mod locator;
pub mod models;
pub mod validation;

pub use api::{GitLabApi, ReqwestGitLabApi};
pub use client::{GitLabCall, MergeRequestClient};
pub use error::ClientError;
pub use locator::{
    Credentials, DEFAULT_GITLAB_HOST, MergeRequestIid, MergeRequestLocator, MergeRequestUrl,
    PersonalAccessToken, ProjectPath,
};
pub use models::{FileChange, MergeRequestChanges, MergeRequestMetadata, UserProfile};
pub use validation::{ShapeCheck, ValidationPolicy};
