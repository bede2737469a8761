//! Recording adapter for the `TrackerClient` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::model::{CommandResult, Issue, User};
use crate::ports::{NewIssue, TrackerClient, TrackerError};

/// Records tracker calls while delegating to an inner implementation.
///
/// Passwords are never written to the cassette.
pub struct RecordingTracker {
    inner: Box<dyn TrackerClient>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingTracker {
    /// Wraps `inner`, appending every call to `recorder`.
    pub fn new(inner: Box<dyn TrackerClient>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct LoginInput<'a> {
    username: &'a str,
}

#[derive(Serialize)]
struct SearchInput<'a> {
    user: &'a str,
    query: &'a str,
}

#[derive(Serialize)]
struct CreateIssueInput<'a> {
    site: &'a str,
    user: &'a str,
    project: &'a str,
    summary: &'a str,
    description: &'a str,
    command: Option<&'a str>,
    visibility: Option<&'a str>,
    attachment: Option<String>,
}

#[derive(Serialize)]
struct CommentInput<'a> {
    site: &'a str,
    user: &'a str,
    issue: &'a str,
    body: &'a str,
    visibility: Option<&'a str>,
    silent: bool,
}

#[derive(Serialize)]
struct ApplyCommandInput<'a> {
    site: &'a str,
    user: &'a str,
    issue: &'a str,
    command: &'a str,
    comment: Option<&'a str>,
    visibility: Option<&'a str>,
    group: Option<&'a str>,
    silent: bool,
}

#[derive(Serialize)]
struct BundleNameInput<'a> {
    user: &'a str,
    project: &'a str,
    field: &'a str,
}

#[derive(Serialize)]
struct AddToBundleInput<'a> {
    site: &'a str,
    user: &'a str,
    bundle: &'a str,
    build_name: &'a str,
}

impl TrackerClient for RecordingTracker {
    fn login(&self, username: &str, password: &str) -> Result<Option<User>, TrackerError> {
        let result = self.inner.login(username, password);
        record_result(&self.recorder, "login", &LoginInput { username }, &result);
        result
    }

    fn search(&self, user: &User, query: &str) -> Result<Vec<Issue>, TrackerError> {
        let result = self.inner.search(user, query);
        let input = SearchInput { user: &user.username, query };
        record_result(&self.recorder, "search", &input, &result);
        result
    }

    fn create_issue(
        &self,
        site: &str,
        user: &User,
        issue: &NewIssue<'_>,
    ) -> Result<CommandResult, TrackerError> {
        let result = self.inner.create_issue(site, user, issue);
        let input = CreateIssueInput {
            site,
            user: &user.username,
            project: issue.project,
            summary: issue.summary,
            description: issue.description,
            command: issue.command,
            visibility: issue.visibility,
            attachment: issue.attachment.map(|p| p.display().to_string()),
        };
        record_result(&self.recorder, "create_issue", &input, &result);
        result
    }

    fn comment(
        &self,
        site: &str,
        user: &User,
        issue: &Issue,
        body: &str,
        visibility: Option<&str>,
        silent: bool,
    ) -> Result<Option<CommandResult>, TrackerError> {
        let result = self.inner.comment(site, user, issue, body, visibility, silent);
        let input =
            CommentInput { site, user: &user.username, issue: &issue.id, body, visibility, silent };
        record_result(&self.recorder, "comment", &input, &result);
        result
    }

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
    ) -> Result<CommandResult, TrackerError> {
        let result = self
            .inner
            .apply_command(site, user, issue, command, comment, visibility, group, silent);
        let input = ApplyCommandInput {
            site,
            user: &user.username,
            issue: &issue.id,
            command,
            comment,
            visibility,
            group,
            silent,
        };
        record_result(&self.recorder, "apply_command", &input, &result);
        result
    }

    fn build_bundle_name_for_field(
        &self,
        user: &User,
        project: &str,
        field: &str,
    ) -> Result<Option<String>, TrackerError> {
        let result = self.inner.build_bundle_name_for_field(user, project, field);
        let input = BundleNameInput { user: &user.username, project, field };
        record_result(&self.recorder, "build_bundle_name_for_field", &input, &result);
        result
    }

    fn add_build_to_bundle(
        &self,
        site: &str,
        user: &User,
        bundle: &str,
        build_name: &str,
    ) -> Result<(), TrackerError> {
        let result = self.inner.add_build_to_bundle(site, user, bundle, build_name);
        let input = AddToBundleInput { site, user: &user.username, bundle, build_name };
        record_result(&self.recorder, "add_build_to_bundle", &input, &result);
        result
    }
}
