//! The create-issue run: file one issue for the current build.

use super::session::TrackerSession;
use super::{enter, non_empty_or, Engine, Outcome, Phase};
use crate::error::EngineError;
use crate::model::{BuildRun, CommandStatus};
use crate::ports::{BuildLog, NewIssue, TemplateExpander};

impl Engine<'_> {
    /// Files a new issue describing the build.
    ///
    /// A rejected creation is recorded and logged, not returned as an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid,
    /// [`EngineError::Authentication`] (with the build marked failed) if the
    /// tracker rejects the user, and [`EngineError::Interrupted`] if the run
    /// was interrupted.
    pub fn create_issue(
        &self,
        run: &mut BuildRun,
        expander: &dyn TemplateExpander,
        log: &dyn BuildLog,
    ) -> Result<Outcome, EngineError> {
        enter(Phase::Init);
        self.config.validate_create_issue()?;
        let Some(site) = self.site() else {
            log.log("No YouTrack site configured");
            enter(Phase::Skipped);
            return Ok(Outcome::Skipped);
        };

        let options = &self.config.create_issue;
        let project = non_empty_or(options.project.as_deref(), &site.project).to_string();
        let summary = expander.expand(&options.summary);
        let description = expander.expand(&options.description);
        let attachment = if options.attach_build_log { run.info().log_file.clone() } else { None };

        enter(Phase::Authenticating);
        let mut session = TrackerSession::open(
            self.ctx.tracker.as_ref(),
            self.ctx.clock.as_ref(),
            site,
            run,
            log,
            self.interrupt(),
        )
        .inspect_err(|_| enter(Phase::Failed))?;
        enter(Phase::Authenticated);

        enter(Phase::Dispatching);
        let request = NewIssue {
            project: &project,
            summary: &summary,
            description: &description,
            command: options.command.as_deref().filter(|c| !c.is_empty()),
            visibility: options.visibility.as_deref(),
            attachment: attachment.as_deref(),
        };
        let (status, issue_id) = session.create_issue(&request)?;

        match (status, issue_id.as_deref()) {
            (CommandStatus::Ok, Some(id)) => {
                session.log(&format!("Created new YouTrack issue {id}"));
            }
            (CommandStatus::Ok, None) => session.log("Created new YouTrack issue"),
            (CommandStatus::Failed, _) => {
                session.log(&format!("FAILED: Creating new YouTrack issue in project {project}"));
            }
        }

        enter(Phase::Done);
        Ok(Outcome::IssueFiled { issue_id, status })
    }
}
