//! Records of individual tracker calls.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker stored in [`CommandResult::command`] for comment calls.
pub const COMMENT_MARKER: &str = "comment";
/// Marker stored in [`CommandResult::command`] for issue creation calls.
pub const CREATE_MARKER: &str = "create";
/// Marker stored in [`CommandResult::command`] for failed searches.
pub const SEARCH_MARKER: &str = "search";

/// Outcome of a tracker call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandStatus {
    /// The tracker accepted the call.
    Ok,
    /// The call failed or returned nothing.
    Failed,
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Ok => "OK",
            Self::Failed => "FAILED",
        })
    }
}

/// The record of one attempted tracker call.
///
/// Fields are private so a result cannot change after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    issue_id: Option<String>,
    command: String,
    date: DateTime<Utc>,
    silent: bool,
    username: String,
    status: CommandStatus,
    comment: Option<String>,
}

impl CommandResult {
    /// Builds a result for a call against `issue_id` (absent for creation
    /// calls whose id is not known yet).
    pub fn new(
        issue_id: Option<String>,
        command: impl Into<String>,
        date: DateTime<Utc>,
        username: impl Into<String>,
        status: CommandStatus,
    ) -> Self {
        Self {
            issue_id,
            command: command.into(),
            date,
            silent: false,
            username: username.into(),
            status,
            comment: None,
        }
    }

    /// Marks the call as executed silently.
    #[must_use]
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Attaches a comment body.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Target issue id, if known.
    #[must_use]
    pub fn issue_id(&self) -> Option<&str> {
        self.issue_id.as_deref()
    }

    /// Command text, or one of the `*_MARKER` constants.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// When the call was made.
    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Whether tracker notifications were suppressed.
    #[must_use]
    pub fn silent(&self) -> bool {
        self.silent
    }

    /// Tracker user that made the call.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Call outcome.
    #[must_use]
    pub fn status(&self) -> CommandStatus {
        self.status
    }

    /// Comment body sent with the call, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Shorthand for `status() == CommandStatus::Ok`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == CommandStatus::Ok
    }
}
