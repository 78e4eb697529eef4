//! Credentials, merge request identity wrappers, and URL parsing.

use std::fmt;

use url::Url;

use super::error::ClientError;

/// Host used when neither configuration nor a merge request URL names one.
pub const DEFAULT_GITLAB_HOST: &str = "https://gitlab.com";

const API_PREFIX: &str = "api/v4/";

/// Personal access token wrapper enforcing presence.
///
/// The `Debug` rendering never includes the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ClientError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ClientError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalAccessToken(<redacted>)")
    }
}

/// GitLab host and the token used to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    host: Url,
    token: PersonalAccessToken,
}

impl Credentials {
    /// Parses the host URL and pairs it with a token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` when the host is not an absolute
    /// HTTP(S) URL.
    pub fn new(host: &str, token: PersonalAccessToken) -> Result<Self, ClientError> {
        let parsed = Url::parse(host).map_err(|error| ClientError::InvalidUrl(error.to_string()))?;
        Self::from_url(parsed, token)
    }

    /// Pairs an already parsed host URL with a token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` for non-HTTP(S) schemes or URLs
    /// without a host.
    pub fn from_url(host: Url, token: PersonalAccessToken) -> Result<Self, ClientError> {
        if !matches!(host.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "unsupported scheme {scheme:?}",
                scheme = host.scheme()
            )));
        }
        if host.host_str().is_none() {
            return Err(ClientError::InvalidUrl("URL must include a host".to_owned()));
        }
        Ok(Self { host, token })
    }

    /// GitLab host URL.
    #[must_use]
    pub const fn host(&self) -> &Url {
        &self.host
    }

    /// Authentication token.
    #[must_use]
    pub const fn token(&self) -> &PersonalAccessToken {
        &self.token
    }

    /// REST API v4 base URL, always ending in `/`.
    ///
    /// Hosts served under a path prefix keep it, so
    /// `https://example.com/gitlab` yields `https://example.com/gitlab/api/v4/`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the API prefix cannot be joined.
    pub fn api_base(&self) -> Result<Url, ClientError> {
        let mut root = self.host.clone();
        root.set_query(None);
        root.set_fragment(None);
        if !root.path().ends_with('/') {
            let with_slash = format!("{}/", root.path());
            root.set_path(&with_slash);
        }
        root.join(API_PREFIX)
            .map_err(|error| ClientError::InvalidUrl(error.to_string()))
    }
}

/// Project slug such as `group/subgroup/project`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath(String);

impl ProjectPath {
    /// Validates a project slug.
    ///
    /// Leading and trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidProjectPath` when the slug is empty, has a
    /// single segment, or contains empty segments.
    pub fn new(value: &str) -> Result<Self, ClientError> {
        let trimmed = value.trim().trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() < 2 || segments.iter().any(|segment| segment.is_empty()) {
            return Err(ClientError::InvalidProjectPath {
                path: value.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the slug.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Slug encoded for use as the `:id` path parameter.
    #[must_use]
    pub fn url_encoded(&self) -> String {
        url::form_urlencoded::byte_serialize(self.0.as_bytes()).collect()
    }
}

/// Project-scoped merge request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRequestIid(u64);

impl MergeRequestIid {
    /// Validates the IID.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidMergeRequestIid` for zero.
    pub const fn new(value: u64) -> Result<Self, ClientError> {
        if value == 0 {
            return Err(ClientError::InvalidMergeRequestIid);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifies one merge request within a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestLocator {
    project: ProjectPath,
    iid: MergeRequestIid,
}

impl MergeRequestLocator {
    /// Builds a locator from a project slug and IID.
    ///
    /// # Errors
    ///
    /// Propagates the validation errors of [`ProjectPath::new`] and
    /// [`MergeRequestIid::new`].
    pub fn new(project: &str, iid: u64) -> Result<Self, ClientError> {
        Ok(Self {
            project: ProjectPath::new(project)?,
            iid: MergeRequestIid::new(iid)?,
        })
    }

    /// Project slug.
    #[must_use]
    pub const fn project(&self) -> &ProjectPath {
        &self.project
    }

    /// Merge request IID.
    #[must_use]
    pub const fn iid(&self) -> MergeRequestIid {
        self.iid
    }

    pub(crate) fn merge_request_path(&self) -> String {
        format!(
            "projects/{}/merge_requests/{}",
            self.project.url_encoded(),
            self.iid.get()
        )
    }

    pub(crate) fn changes_path(&self) -> String {
        format!("{}/changes", self.merge_request_path())
    }
}

/// A parsed merge request web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestUrl {
    host: Url,
    locator: MergeRequestLocator,
}

impl MergeRequestUrl {
    /// Parses a GitLab merge request URL in the form
    /// `https://gitlab.com/<namespace>/<project>/-/merge_requests/<iid>`.
    ///
    /// Nested groups and the legacy form without the `-` segment are
    /// accepted, as are trailing segments such as `/diffs`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` when parsing fails,
    /// `MissingPathSegments` when the path does not name a merge request, and
    /// `InvalidMergeRequestIid` when the IID is not a positive integer.
    pub fn parse(input: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(input).map_err(|error| ClientError::InvalidUrl(error.to_string()))?;
        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidUrl("URL must include a host".to_owned()));
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .ok_or(ClientError::MissingPathSegments)?
            .collect();

        let marker = segments
            .iter()
            .position(|segment| *segment == "merge_requests")
            .ok_or(ClientError::MissingPathSegments)?;

        let project_segments = match segments.get(..marker) {
            Some([head @ .., "-"]) => head,
            Some(all) => all,
            None => return Err(ClientError::MissingPathSegments),
        };

        let iid_segment = segments
            .get(marker.saturating_add(1))
            .filter(|segment| !segment.is_empty())
            .ok_or(ClientError::MissingPathSegments)?;

        if project_segments.len() < 2 {
            return Err(ClientError::MissingPathSegments);
        }

        let iid = iid_segment
            .parse::<u64>()
            .map_err(|_| ClientError::InvalidMergeRequestIid)
            .and_then(MergeRequestIid::new)?;
        let project = ProjectPath::new(&project_segments.join("/"))
            .map_err(|_| ClientError::MissingPathSegments)?;

        let mut host = parsed;
        host.set_path("/");
        host.set_query(None);
        host.set_fragment(None);

        Ok(Self {
            host,
            locator: MergeRequestLocator { project, iid },
        })
    }

    /// Host portion of the URL (scheme, host and port).
    #[must_use]
    pub const fn host(&self) -> &Url {
        &self.host
    }

    /// Project and IID named by the URL.
    #[must_use]
    pub const fn locator(&self) -> &MergeRequestLocator {
        &self.locator
    }

    /// Consumes the URL, returning the locator.
    #[must_use]
    pub fn into_locator(self) -> MergeRequestLocator {
        self.locator
    }
}
