//! Raw GitLab REST access.
//!
//! [`GitLabApi`] is the seam between the request pipelines and HTTP. Its
//! methods return loosely typed JSON documents; shape checks and decoding
//! happen in [`MergeRequestClient`](crate::gitlab::MergeRequestClient).

mod client;
mod error_mapping;

pub use client::ReqwestGitLabApi;

use async_trait::async_trait;
use serde_json::Value;

use crate::gitlab::error::ClientError;
use crate::gitlab::locator::MergeRequestLocator;

/// Operations the GitLab REST API exposes to this crate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// `GET /user`: the profile owning the token.
    async fn current_user(&self) -> Result<Value, ClientError>;

    /// `GET /projects/:id/merge_requests/:iid`.
    async fn merge_request(&self, locator: &MergeRequestLocator) -> Result<Value, ClientError>;

    /// `GET /projects/:id/merge_requests/:iid/changes`.
    async fn merge_request_changes(
        &self,
        locator: &MergeRequestLocator,
    ) -> Result<Value, ClientError>;
}
