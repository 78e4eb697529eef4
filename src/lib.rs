//! Tanuki library crate providing failure-aware GitLab merge request access.
//!
//! Every remote operation is exposed as a [`Deferred`] pipeline: a value that
//! does nothing until run, then always completes with a `Result`. Pipelines
//! log raw responses through a [`LogSink`], check each response's shape, and
//! decode typed records.

pub mod config;
pub mod deferred;
pub mod gitlab;
pub mod output;

pub use config::TanukiConfig;
pub use deferred::{Deferred, LogSink, NoopLogSink, TracingLogSink, Unwound};
pub use gitlab::{
    ClientError, Credentials, GitLabApi, GitLabCall, MergeRequestChanges, MergeRequestClient,
    MergeRequestLocator, MergeRequestMetadata, MergeRequestUrl, PersonalAccessToken,
    ReqwestGitLabApi, UserProfile, ValidationPolicy,
};
