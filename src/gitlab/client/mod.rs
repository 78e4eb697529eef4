//! Request pipelines for each GitLab operation.
//!
//! Every method returns a [`GitLabCall`]: nothing is sent until the caller
//! runs it. Each pipeline lifts the raw API call, logs the raw response on
//! success, then applies the call site's [`ShapeCheck`] and decodes the typed
//! record.

use std::sync::Arc;

use serde_json::Value;

use crate::deferred::{Deferred, LogSink, TracingLogSink};

use super::api::GitLabApi;
use super::error::ClientError;
use super::locator::MergeRequestLocator;
use super::models::{MergeRequestChanges, MergeRequestMetadata, UserProfile};
use super::validation::{ShapeCheck, ValidationPolicy};

/// Deferred GitLab operation resolving to `T` or a [`ClientError`].
pub type GitLabCall<T> = Deferred<T, ClientError>;

/// Builds failure-aware pipelines over a [`GitLabApi`].
pub struct MergeRequestClient<Api>
where
    Api: GitLabApi + 'static,
{
    api: Arc<Api>,
    sink: Arc<dyn LogSink>,
    policy: ValidationPolicy,
}

impl<Api> MergeRequestClient<Api>
where
    Api: GitLabApi + 'static,
{
    /// Creates a client that logs through [`TracingLogSink`] and applies the
    /// default [`ValidationPolicy`].
    #[must_use]
    pub fn new(api: Api) -> Self {
        Self {
            api: Arc::new(api),
            sink: Arc::new(TracingLogSink),
            policy: ValidationPolicy::default(),
        }
    }

    /// Replaces the sink that observes successful responses.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the shape checks applied to responses.
    #[must_use]
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shape checks in effect.
    #[must_use]
    pub const fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Fetches the profile of the user owning the token.
    #[must_use]
    pub fn current_user(&self) -> GitLabCall<UserProfile> {
        let api = Arc::clone(&self.api);
        let request = Deferred::lift(move || {
            let handle = Arc::clone(&api);
            async move {
                tracing::debug!("fetching current user");
                handle.current_user().await
            }
        });
        self.finish(request, "current user", self.policy.user.clone())
    }

    /// Fetches merge request metadata.
    #[must_use]
    pub fn merge_request(&self, locator: &MergeRequestLocator) -> GitLabCall<MergeRequestMetadata> {
        let api = Arc::clone(&self.api);
        let target = locator.clone();
        let request = Deferred::lift(move || {
            let handle = Arc::clone(&api);
            let request_target = target.clone();
            async move {
                tracing::debug!(
                    project = request_target.project().as_str(),
                    iid = request_target.iid().get(),
                    "fetching merge request"
                );
                handle.merge_request(&request_target).await
            }
        });
        self.finish(request, "merge request", self.policy.merge_request.clone())
    }

    /// Fetches the files changed by a merge request, including diffs.
    #[must_use]
    pub fn merge_request_changes(
        &self,
        locator: &MergeRequestLocator,
    ) -> GitLabCall<MergeRequestChanges> {
        let api = Arc::clone(&self.api);
        let target = locator.clone();
        let request = Deferred::lift(move || {
            let handle = Arc::clone(&api);
            let request_target = target.clone();
            async move {
                tracing::debug!(
                    project = request_target.project().as_str(),
                    iid = request_target.iid().get(),
                    "fetching merge request changes"
                );
                handle.merge_request_changes(&request_target).await
            }
        });
        self.finish(
            request,
            "merge request changes",
            self.policy.changes.clone(),
        )
    }

    fn finish<T>(
        &self,
        request: GitLabCall<Value>,
        label: &str,
        check: ShapeCheck,
    ) -> GitLabCall<T>
    where
        T: TryFrom<Value, Error = ClientError> + Send + 'static,
    {
        request
            .tap_ok(Arc::clone(&self.sink), label)
            .and_then_validate(move |raw| check.check(raw).and_then(T::try_from))
    }
}
