//! Tracker client port: the contract the engine expects from an issue tracker.

use std::path::Path;

use crate::model::{CommandResult, Issue, User};

/// Error type returned by tracker calls that fail below the engine
/// (transport, parsing, server errors).
pub type TrackerError = Box<dyn std::error::Error + Send + Sync>;

/// Everything needed to file a new issue.
#[derive(Debug, Clone, Copy)]
pub struct NewIssue<'a> {
    /// Project key the issue is filed in.
    pub project: &'a str,
    /// Issue summary, already expanded.
    pub summary: &'a str,
    /// Issue description, already expanded.
    pub description: &'a str,
    /// Command applied to the new issue, if any.
    pub command: Option<&'a str>,
    /// Visibility group for the issue, if restricted.
    pub visibility: Option<&'a str>,
    /// Build log to attach, if enabled.
    pub attachment: Option<&'a Path>,
}

/// Talks to an issue tracker on behalf of the engine.
///
/// Implementations own transport, retries, and authentication renewal.
/// Calls that produce a [`CommandResult`] report tracker-side rejection as
/// a `FAILED` result; `Err` is reserved for calls that never completed.
pub trait TrackerClient: Send + Sync {
    /// Logs in, returning `None` when the tracker rejects the credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker cannot be reached.
    fn login(&self, username: &str, password: &str) -> Result<Option<User>, TrackerError>;

    /// Runs a tracker search query, returning matches in tracker order.
    ///
    /// # Errors
    ///
    /// Returns an error if the search cannot be executed.
    fn search(&self, user: &User, query: &str) -> Result<Vec<Issue>, TrackerError>;

    /// Files a new issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request never completed.
    fn create_issue(
        &self,
        site: &str,
        user: &User,
        issue: &NewIssue<'_>,
    ) -> Result<CommandResult, TrackerError>;

    /// Posts a comment. `Ok(None)` means the tracker returned no result.
    ///
    /// # Errors
    ///
    /// Returns an error if the request never completed.
    fn comment(
        &self,
        site: &str,
        user: &User,
        issue: &Issue,
        body: &str,
        visibility: Option<&str>,
        silent: bool,
    ) -> Result<Option<CommandResult>, TrackerError>;

    /// Applies a free-form command to an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the request never completed.
    #[allow(clippy::too_many_arguments)]
    fn apply_command(
        &self,
        site: &str,
        user: &User,
        issue: &Issue,
        command: &str,
        comment: Option<&str>,
        visibility: Option<&str>,
        group: Option<&str>,
        silent: bool,
    ) -> Result<CommandResult, TrackerError>;

    /// Looks up the build bundle backing `field` in `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or field cannot be read.
    fn build_bundle_name_for_field(
        &self,
        user: &User,
        project: &str,
        field: &str,
    ) -> Result<Option<String>, TrackerError>;

    /// Adds `build_name` to the bundle, creating the bundle entry if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle cannot be updated.
    fn add_build_to_bundle(
        &self,
        site: &str,
        user: &User,
        bundle: &str,
        build_name: &str,
    ) -> Result<(), TrackerError>;
}
