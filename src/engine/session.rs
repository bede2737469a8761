//! An authenticated tracker session scoped to one build execution.
//!
//! Every write call made through the session lands in the build's run
//! record exactly once, whether the tracker accepted it, rejected it, or
//! never answered.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::error::EngineError;
use crate::model::command::{COMMENT_MARKER, CREATE_MARKER, SEARCH_MARKER};
use crate::model::{BuildRun, CommandResult, CommandStatus, Issue, User};
use crate::ports::{BuildLog, Clock, NewIssue, TrackerClient};

/// Tracker access for one execution, after a successful login.
pub struct TrackerSession<'a> {
    tracker: &'a dyn TrackerClient,
    clock: &'a dyn Clock,
    site: &'a SiteConfig,
    user: User,
    run: &'a mut BuildRun,
    log: &'a dyn BuildLog,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a> TrackerSession<'a> {
    /// Logs in with the site's credentials.
    ///
    /// On success the build's run record is attached. On failure the
    /// build is marked failed and no further tracker call is made.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Authentication`] if the tracker rejects the
    /// user or cannot be reached.
    pub fn open(
        tracker: &'a dyn TrackerClient,
        clock: &'a dyn Clock,
        site: &'a SiteConfig,
        run: &'a mut BuildRun,
        log: &'a dyn BuildLog,
        interrupt: Option<&'a AtomicBool>,
    ) -> Result<Self, EngineError> {
        let user = match tracker.login(&site.username, &site.resolve_password()) {
            Ok(Some(user)) if user.is_logged_in() => Some(user),
            Ok(_) => None,
            Err(e) => {
                warn!(site = %site.name, error = %e, "tracker login failed");
                None
            }
        };

        let Some(user) = user else {
            log.log("Could not login user to YouTrack");
            run.mark_failed();
            return Err(EngineError::Authentication { username: site.username.clone() });
        };

        debug!(site = %site.name, user = %user.username, "authenticated");
        run.record_mut();
        Ok(Self { tracker, clock, site, user, run, log, interrupt })
    }

    /// The site this session talks to.
    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        self.site
    }

    /// Writes a line to the build log.
    pub fn log(&self, line: &str) {
        self.log.log(line);
    }

    /// Searches the tracker. A failed search is recorded and logged, and
    /// yields no issues.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Interrupted`] if the execution was interrupted.
    pub fn search(&mut self, query: &str) -> Result<Vec<Issue>, EngineError> {
        self.checkpoint()?;
        match self.tracker.search(&self.user, query) {
            Ok(issues) => Ok(issues),
            Err(e) => {
                warn!(query, error = %e, "search failed");
                self.log(&format!("FAILED: search \"{query}\": {e}"));
                let failed = self.failed(None, SEARCH_MARKER).with_comment(query);
                self.record(failed);
                Ok(Vec::new())
            }
        }
    }

    /// Posts a build comment on `issue` and records the outcome.
    ///
    /// A missing tracker result is recorded as `FAILED`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Interrupted`] if the execution was interrupted.
    pub fn comment(&mut self, issue: &Issue, body: &str) -> Result<CommandStatus, EngineError> {
        self.checkpoint()?;
        let site = self.site;
        let result = match self.tracker.comment(
            &site.name,
            &self.user,
            issue,
            body,
            site.link_visibility.as_deref(),
            site.silent_links,
        ) {
            Ok(Some(result)) => result,
            Ok(None) => {
                debug!(issue = %issue.id, "tracker returned no comment result");
                self.failed(Some(&issue.id), COMMENT_MARKER)
                    .with_silent(site.silent_links)
                    .with_comment(body)
            }
            Err(e) => {
                warn!(issue = %issue.id, error = %e, "comment failed");
                self.failed(Some(&issue.id), COMMENT_MARKER)
                    .with_silent(site.silent_links)
                    .with_comment(body)
            }
        };
        Ok(self.record(result))
    }

    /// Applies `command` to `issue` and records the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Interrupted`] if the execution was interrupted.
    pub fn apply_command(
        &mut self,
        issue: &Issue,
        command: &str,
        comment: &str,
    ) -> Result<CommandStatus, EngineError> {
        self.checkpoint()?;
        let site = self.site;
        let result = self
            .tracker
            .apply_command(
                &site.name,
                &self.user,
                issue,
                command,
                Some(comment),
                None,
                None,
                site.silent_commands,
            )
            .unwrap_or_else(|e| {
                warn!(issue = %issue.id, command, error = %e, "command failed");
                self.failed(Some(&issue.id), command)
                    .with_silent(site.silent_commands)
                    .with_comment(comment)
            });
        Ok(self.record(result))
    }

    /// Files a new issue and records the outcome. Returns the new issue id
    /// when the tracker reported one.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Interrupted`] if the execution was interrupted.
    pub fn create_issue(
        &mut self,
        issue: &NewIssue<'_>,
    ) -> Result<(CommandStatus, Option<String>), EngineError> {
        self.checkpoint()?;
        let result = self.tracker.create_issue(&self.site.name, &self.user, issue).unwrap_or_else(
            |e| {
                warn!(project = issue.project, error = %e, "issue creation failed");
                self.failed(None, CREATE_MARKER).with_comment(issue.summary)
            },
        );
        let id = result.issue_id().map(str::to_string);
        Ok((self.record(result), id))
    }

    /// Adds `build_name` to the bundle behind `field` in `project`.
    ///
    /// Bundle updates are logged but not part of the run record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Interrupted`] if the execution was interrupted.
    pub fn add_build_to_bundle(
        &mut self,
        project: &str,
        field: &str,
        build_name: &str,
    ) -> Result<(), EngineError> {
        self.checkpoint()?;
        let bundle = match self.tracker.build_bundle_name_for_field(&self.user, project, field) {
            Ok(Some(bundle)) => bundle,
            Ok(None) => {
                self.log(&format!(
                    "FAILED: no build bundle for field \"{field}\" in project {project}"
                ));
                return Ok(());
            }
            Err(e) => {
                self.log(&format!(
                    "FAILED: looking up build bundle for field \"{field}\" in project {project}: {e}"
                ));
                return Ok(());
            }
        };

        self.checkpoint()?;
        match self.tracker.add_build_to_bundle(&self.site.name, &self.user, &bundle, build_name) {
            Ok(()) => self.log(&format!("Added build {build_name} to bundle {bundle}")),
            Err(e) => {
                self.log(&format!("FAILED: Adding build {build_name} to bundle {bundle}: {e}"));
            }
        }
        Ok(())
    }

    fn record(&mut self, result: CommandResult) -> CommandStatus {
        let status = result.status();
        self.run.record_mut().add_command(result);
        status
    }

    fn failed(&self, issue_id: Option<&str>, command: &str) -> CommandResult {
        CommandResult::new(
            issue_id.map(str::to_string),
            command,
            self.clock.now(),
            &self.user.username,
            CommandStatus::Failed,
        )
    }

    fn checkpoint(&self) -> Result<(), EngineError> {
        if self.interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            let completed = self.run.record().map_or(0, |r| r.num_commands());
            return Err(EngineError::Interrupted { completed });
        }
        Ok(())
    }
}
