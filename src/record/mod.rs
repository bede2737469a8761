//! The build-scoped audit log of tracker calls.

pub mod store;

use serde::{Deserialize, Serialize};

use crate::model::{CommandResult, CommandStatus};

/// Display name the orchestrator shows for a run record.
pub const DISPLAY_NAME: &str = "YouTrack Commands";

/// Every tracker call attempted for one build, in call order.
///
/// Append-only: results can be added and read, never changed or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    issue_url: String,
    commands: Vec<CommandResult>,
}

impl RunRecord {
    /// Creates an empty record. `issue_url` is the prefix the orchestrator
    /// joins with an issue id to link to the tracker's issue page.
    pub fn new(issue_url: impl Into<String>) -> Self {
        Self { issue_url: issue_url.into(), commands: Vec::new() }
    }

    /// Appends a call result.
    pub fn add_command(&mut self, command: CommandResult) {
        self.commands.push(command);
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn num_commands(&self) -> usize {
        self.commands.len()
    }

    /// Recorded calls in call order.
    #[must_use]
    pub fn commands(&self) -> &[CommandResult] {
        &self.commands
    }

    /// Calls that ended `FAILED`.
    pub fn failures(&self) -> impl Iterator<Item = &CommandResult> {
        self.commands.iter().filter(|c| c.status() == CommandStatus::Failed)
    }

    /// Issue page prefix, e.g. `https://tracker.example.com/issue/`.
    #[must_use]
    pub fn issue_url(&self) -> &str {
        &self.issue_url
    }
}

/// Builds the issue page prefix for a tracker base URL.
#[must_use]
pub fn issue_url_for(site_url: &str) -> String {
    format!("{}/issue/", site_url.trim_end_matches('/'))
}
