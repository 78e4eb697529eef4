//! Typed views over GitLab responses.
//!
//! Each record keeps the response document untouched in `raw`; the typed
//! fields are read from it and add nothing new. Types prefixed with `Api`
//! are internal deserialisation targets.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ClientError;

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    /// Numeric user identifier.
    pub id: u64,
    /// Login name.
    pub username: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Account state (e.g. active, blocked).
    pub state: Option<String>,
    /// Profile URL.
    pub web_url: Option<String>,
    /// Response document as returned by GitLab.
    pub raw: Value,
}

/// Merge request metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequestMetadata {
    /// Instance-wide identifier.
    pub id: Option<u64>,
    /// Project-scoped identifier.
    pub iid: u64,
    /// Identifier of the target project.
    pub project_id: Option<u64>,
    /// Title of the merge request.
    pub title: Option<String>,
    /// Description body.
    pub description: Option<String>,
    /// State (e.g. opened, merged, closed).
    pub state: Option<String>,
    /// Web URL for displaying to a user.
    pub web_url: Option<String>,
    /// Author username if present.
    pub author: Option<String>,
    /// Branch the changes come from.
    pub source_branch: Option<String>,
    /// Branch the changes merge into.
    pub target_branch: Option<String>,
    /// Response document as returned by GitLab.
    pub raw: Value,
}

/// One file touched by a merge request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChange {
    /// Path before the change.
    pub old_path: String,
    /// Path after the change.
    pub new_path: String,
    /// Unified diff hunk text.
    pub diff: String,
    /// Whether the file was added.
    pub new_file: bool,
    /// Whether the file was renamed.
    pub renamed_file: bool,
    /// Whether the file was deleted.
    pub deleted_file: bool,
}

impl FileChange {
    /// Single-letter marker: `A` added, `D` deleted, `R` renamed, `M`
    /// modified.
    #[must_use]
    pub const fn marker(&self) -> char {
        if self.new_file {
            'A'
        } else if self.deleted_file {
            'D'
        } else if self.renamed_file {
            'R'
        } else {
            'M'
        }
    }
}

/// Files changed by a merge request.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequestChanges {
    /// Project-scoped merge request identifier, when present.
    pub iid: Option<u64>,
    /// Changed files.
    pub changes: Vec<FileChange>,
    /// Response document as returned by GitLab.
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiUser {
    id: u64,
    username: Option<String>,
    name: Option<String>,
    state: Option<String>,
    web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiAuthor {
    username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiMergeRequest {
    id: Option<u64>,
    iid: u64,
    project_id: Option<u64>,
    title: Option<String>,
    description: Option<String>,
    state: Option<String>,
    web_url: Option<String>,
    author: Option<ApiAuthor>,
    source_branch: Option<String>,
    target_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiFileChange {
    old_path: String,
    new_path: String,
    #[serde(default)]
    diff: String,
    #[serde(default)]
    new_file: bool,
    #[serde(default)]
    renamed_file: bool,
    #[serde(default)]
    deleted_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChanges {
    iid: Option<u64>,
    changes: Vec<ApiFileChange>,
}

fn decode<T>(what: &str, raw: &Value) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    T::deserialize(raw).map_err(|error| ClientError::Decode {
        message: format!("{what}: {error}"),
    })
}

impl TryFrom<Value> for UserProfile {
    type Error = ClientError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let api: ApiUser = decode("user profile", &raw)?;
        Ok(Self {
            id: api.id,
            username: api.username,
            name: api.name,
            state: api.state,
            web_url: api.web_url,
            raw,
        })
    }
}

impl TryFrom<Value> for MergeRequestMetadata {
    type Error = ClientError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let api: ApiMergeRequest = decode("merge request", &raw)?;
        Ok(Self {
            id: api.id,
            iid: api.iid,
            project_id: api.project_id,
            title: api.title,
            description: api.description,
            state: api.state,
            web_url: api.web_url,
            author: api.author.and_then(|author| author.username),
            source_branch: api.source_branch,
            target_branch: api.target_branch,
            raw,
        })
    }
}

impl From<ApiFileChange> for FileChange {
    fn from(value: ApiFileChange) -> Self {
        Self {
            old_path: value.old_path,
            new_path: value.new_path,
            diff: value.diff,
            new_file: value.new_file,
            renamed_file: value.renamed_file,
            deleted_file: value.deleted_file,
        }
    }
}

impl TryFrom<Value> for MergeRequestChanges {
    type Error = ClientError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let api: ApiChanges = decode("merge request changes", &raw)?;
        Ok(Self {
            iid: api.iid,
            changes: api.changes.into_iter().map(FileChange::from).collect(),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{FileChange, MergeRequestChanges, MergeRequestMetadata, UserProfile};
    use crate::gitlab::error::ClientError;

    #[rstest]
    fn user_profile_keeps_raw_document() {
        let raw = json!({"id": 5, "username": "root", "is_admin": true});
        let profile = UserProfile::try_from(raw.clone()).expect("profile should decode");

        assert_eq!(profile.id, 5);
        assert_eq!(profile.username.as_deref(), Some("root"));
        assert_eq!(profile.raw, raw, "raw document must be untouched");
    }

    #[rstest]
    fn user_profile_rejects_non_numeric_id() {
        let result = UserProfile::try_from(json!({"id": "five"}));
        assert!(
            matches!(result, Err(ClientError::Decode { ref message }) if message.starts_with("user profile")),
            "expected Decode error, got {result:?}"
        );
    }

    #[rstest]
    fn merge_request_reads_author_username() {
        let metadata = MergeRequestMetadata::try_from(json!({
            "id": 900,
            "iid": 7,
            "title": "Add tap combinator",
            "author": {"id": 1, "username": "alice"},
            "source_branch": "feature/tap",
            "target_branch": "main"
        }))
        .expect("merge request should decode");

        assert_eq!(metadata.iid, 7);
        assert_eq!(metadata.author.as_deref(), Some("alice"));
        assert_eq!(metadata.target_branch.as_deref(), Some("main"));
        assert_eq!(metadata.state, None);
    }

    #[rstest]
    fn changes_default_missing_flags_to_false() {
        let changes = MergeRequestChanges::try_from(json!({
            "iid": 7,
            "changes": [{"old_path": "a.rs", "new_path": "a.rs"}]
        }))
        .expect("changes should decode");

        assert_eq!(
            changes.changes,
            vec![FileChange {
                old_path: "a.rs".to_owned(),
                new_path: "a.rs".to_owned(),
                ..FileChange::default()
            }]
        );
    }

    #[rstest]
    #[case::added(FileChange { new_file: true, ..FileChange::default() }, 'A')]
    #[case::deleted(FileChange { deleted_file: true, ..FileChange::default() }, 'D')]
    #[case::renamed(FileChange { renamed_file: true, ..FileChange::default() }, 'R')]
    #[case::modified(FileChange::default(), 'M')]
    fn file_change_markers(#[case] change: FileChange, #[case] expected: char) {
        assert_eq!(change.marker(), expected);
    }
}
