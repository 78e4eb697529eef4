//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.tanuki.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `TANUKI_HOST`, `TANUKI_TOKEN`, or legacy
//!    `GITLAB_TOKEN`
//! 4. **Command-line arguments** – `--mr-url`/`-u`, `--token`/`-t`, and
//!    friends
//!
//! # Configuration File
//!
//! ```toml
//! host = "https://gitlab.example.com"
//! token = "glpat-example"
//! project = "group/project"
//! iid = 42
//! user_required_field = "username"
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::gitlab::error::ClientError;
use crate::gitlab::locator::{
    Credentials, DEFAULT_GITLAB_HOST, MergeRequestLocator, MergeRequestUrl, PersonalAccessToken,
};
use crate::gitlab::validation::{ShapeCheck, ValidationPolicy};

/// Environment variable consulted when no token is configured.
pub const LEGACY_TOKEN_VARIABLE: &str = "GITLAB_TOKEN";

/// Operation mode determined by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Fetch the profile owning the token.
    CurrentUser,
    /// Fetch one merge request and its changes.
    MergeRequest,
}

/// The merge request the CLI should load, with the host it lives on when the
/// target came from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestTarget {
    /// Host parsed from the merge request URL, if one was given.
    pub url_host: Option<Url>,
    /// Project and IID.
    pub locator: MergeRequestLocator,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `TANUKI_HOST` or `--host`: GitLab base URL
/// - `TANUKI_TOKEN`, `GITLAB_TOKEN`, or `--token`: Authentication token
/// - `TANUKI_MR_URL` or `--mr-url`: Merge request URL
/// - `TANUKI_PROJECT` or `--project`: Project slug
/// - `TANUKI_IID` or `--iid`: Merge request IID
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use tanuki::TanukiConfig;
///
/// let config = TanukiConfig::load().expect("failed to load configuration");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "TANUKI",
    discovery(
        dotfile_name = ".tanuki.toml",
        config_file_name = "tanuki.toml",
        app_name = "tanuki"
    )
)]
pub struct TanukiConfig {
    /// GitLab base URL, e.g. `https://gitlab.example.com`.
    ///
    /// Defaults to the host of `mr_url`, then to `https://gitlab.com`.
    #[ortho_config(cli_short = 'H')]
    pub host: Option<String>,

    /// Personal access token for GitLab API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `TANUKI_TOKEN` or `GITLAB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitLab merge request URL to load.
    #[ortho_config(cli_short = 'u')]
    pub mr_url: Option<String>,

    /// Project slug (e.g., "group/project").
    #[ortho_config(cli_short = 'p')]
    pub project: Option<String>,

    /// Merge request IID within `project`.
    #[ortho_config(cli_short = 'i')]
    pub iid: Option<u64>,

    /// Only fetch the current user, even when a merge request is named.
    ///
    /// Environment variables cannot set this flag because `ortho_config` does
    /// not load boolean values from the environment.
    #[ortho_config(cli_short = 'w')]
    pub whoami: bool,

    /// Key the current user response must contain (default `id`).
    #[ortho_config()]
    pub user_required_field: Option<String>,

    /// Key the merge request response must contain (default `iid`).
    #[ortho_config()]
    pub merge_request_required_field: Option<String>,

    /// Key the merge request changes response must contain (default
    /// `changes`).
    #[ortho_config()]
    pub changes_required_field: Option<String>,
}

impl TanukiConfig {
    /// Resolves the token from configuration or the legacy `GITLAB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, ClientError> {
        self.token
            .clone()
            .or_else(|| env::var(LEGACY_TOKEN_VARIABLE).ok())
            .ok_or(ClientError::MissingToken)
    }

    /// Determines the operation mode.
    ///
    /// Returns `CurrentUser` when `whoami` is set or no merge request is
    /// named, otherwise `MergeRequest`.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.whoami {
            return OperationMode::CurrentUser;
        }
        if self.mr_url.is_some() || (self.project.is_some() && self.iid.is_some()) {
            OperationMode::MergeRequest
        } else {
            OperationMode::CurrentUser
        }
    }

    /// Resolves the merge request to load.
    ///
    /// A merge request URL takes precedence over `project` and `iid`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingMergeRequest`] when neither form is
    /// configured, or the parsing errors of [`MergeRequestUrl::parse`] and
    /// [`MergeRequestLocator::new`].
    pub fn merge_request_target(&self) -> Result<MergeRequestTarget, ClientError> {
        if let Some(mr_url) = self.mr_url.as_deref() {
            let parsed = MergeRequestUrl::parse(mr_url)?;
            return Ok(MergeRequestTarget {
                url_host: Some(parsed.host().clone()),
                locator: parsed.into_locator(),
            });
        }

        match (self.project.as_deref(), self.iid) {
            (Some(project), Some(iid)) => Ok(MergeRequestTarget {
                url_host: None,
                locator: MergeRequestLocator::new(project, iid)?,
            }),
            _ => Err(ClientError::MissingMergeRequest),
        }
    }

    /// Builds credentials from the configured host, falling back to
    /// `url_host` and then to `https://gitlab.com`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingToken`] when no token is available and
    /// [`ClientError::InvalidUrl`] when the host cannot be parsed.
    pub fn resolve_credentials(
        &self,
        url_host: Option<&Url>,
    ) -> Result<Credentials, ClientError> {
        let token = PersonalAccessToken::new(self.resolve_token()?)?;
        match (self.host.as_deref(), url_host) {
            (Some(host), _) => Credentials::new(host, token),
            (None, Some(parsed)) => Credentials::from_url(parsed.clone(), token),
            (None, None) => Credentials::new(DEFAULT_GITLAB_HOST, token),
        }
    }

    /// Builds credentials for the current user lookup.
    ///
    /// A configured merge request URL still names the server when `host` is
    /// unset, so a self-hosted token is never sent to `https://gitlab.com`.
    ///
    /// # Errors
    ///
    /// Returns the parsing errors of [`MergeRequestUrl::parse`] for a
    /// malformed `mr_url`, and the errors of
    /// [`resolve_credentials`](Self::resolve_credentials).
    pub fn current_user_credentials(&self) -> Result<Credentials, ClientError> {
        let url_host = self
            .mr_url
            .as_deref()
            .map(MergeRequestUrl::parse)
            .transpose()?
            .map(|parsed| parsed.host().clone());
        self.resolve_credentials(url_host.as_ref())
    }

    /// Builds the validation policy, applying any required-field overrides.
    #[must_use]
    pub fn validation_policy(&self) -> ValidationPolicy {
        let defaults = ValidationPolicy::default();
        ValidationPolicy {
            user: override_field(&defaults.user, self.user_required_field.as_deref()),
            merge_request: override_field(
                &defaults.merge_request,
                self.merge_request_required_field.as_deref(),
            ),
            changes: override_field(&defaults.changes, self.changes_required_field.as_deref()),
        }
    }
}

fn override_field(
    check: &ShapeCheck,
    field: Option<&str>,
) -> ShapeCheck {
    field
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| check.clone(), |name| check.with_required_field(name))
}

#[cfg(test)]
mod tests;
