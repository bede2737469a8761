//! Issue reference extraction.
//!
//! References are not parsed locally. The tracker indexes commit metadata
//! itself, so a commit is turned into a tracker query and the tracker's own
//! matching rules decide which issues it mentions.

/// Query prefix understood by the tracker's search.
pub const VCS_CHANGES_QUERY: &str = "vcs changes: ";

/// Builds the search query finding issues that reference `commit_id`.
#[must_use]
pub fn extract(commit_id: &str) -> String {
    format!("{VCS_CHANGES_QUERY}{commit_id}")
}
