//! Version-control changelog entries supplied by the orchestrator.

use serde::{Deserialize, Serialize};

/// One commit associated with a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangeLogEntry {
    /// Commit identifier as reported by the VCS.
    pub commit_id: String,
    /// Commit author.
    pub author: String,
    /// Full commit message.
    #[serde(rename = "msg", alias = "message")]
    pub message: String,
    /// Paths touched by the commit, in VCS order.
    #[serde(default)]
    pub affected_paths: Vec<String>,
}

impl ChangeLogEntry {
    /// Creates an entry with no affected paths.
    pub fn new(
        commit_id: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            commit_id: commit_id.into(),
            author: author.into(),
            message: message.into(),
            affected_paths: Vec::new(),
        }
    }
}
