//! Summaries printed by the command-line interface.

use std::io::Write;
use std::iter;

use crate::gitlab::error::ClientError;
use crate::gitlab::models::{MergeRequestChanges, MergeRequestMetadata, UserProfile};

/// One-line summary of the authenticated user.
#[must_use]
pub fn user_summary(profile: &UserProfile) -> String {
    let username = profile.username.as_deref().unwrap_or("unknown user");
    format!("Authenticated as {username} (id {})", profile.id)
}

/// Multi-line summary of a merge request followed by one line per changed
/// file, prefixed with its [`marker`](crate::gitlab::FileChange::marker).
#[must_use]
pub fn merge_request_summary(
    metadata: &MergeRequestMetadata,
    changes: &MergeRequestChanges,
) -> String {
    let title = metadata.title.as_deref().unwrap_or("untitled merge request");
    let author = metadata.author.as_deref().unwrap_or("unknown author");
    let state = metadata.state.as_deref().unwrap_or("unknown state");
    let url = metadata.web_url.as_deref().unwrap_or("no web URL provided");
    let source = metadata.source_branch.as_deref().unwrap_or("?");
    let target = metadata.target_branch.as_deref().unwrap_or("?");

    let header = format!(
        "Loaded MR !{} by {author} ({state}): {title}\nURL: {url}\nBranches: {source} -> {target}\nChanged files: {}",
        metadata.iid,
        changes.changes.len()
    );
    let files = changes
        .changes
        .iter()
        .map(|change| format!("  {} {}", change.marker(), change.new_path));

    iter::once(header).chain(files).collect::<Vec<_>>().join("\n")
}

/// Writes `summary` and a trailing newline to `writer`.
///
/// # Errors
///
/// Returns [`ClientError::Io`] when the writer fails.
pub fn write_summary_to<W: Write>(writer: &mut W, summary: &str) -> Result<(), ClientError> {
    writeln!(writer, "{summary}").map_err(|error| ClientError::Io {
        message: error.to_string(),
    })
}
