//! The update-issues run: resolve the changelog, then dispatch.

use super::compose::CommentOptions;
use super::dispatch::{dispatch, BundleTarget, DispatchPlan};
use super::resolve::resolve;
use super::session::TrackerSession;
use super::{enter, non_empty_or, Engine, Outcome, Phase};
use crate::config::COMMAND_COMMENT;
use crate::error::EngineError;
use crate::model::{BuildRun, ChangeLogEntry};
use crate::ports::{BuildLog, TemplateExpander};

impl Engine<'_> {
    /// Links `changelog` to tracker issues and updates each of them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the configuration is invalid,
    /// [`EngineError::Authentication`] (with the build marked failed) if the
    /// tracker rejects the user, and [`EngineError::Interrupted`] if the run
    /// was interrupted.
    pub fn update_issues(
        &self,
        run: &mut BuildRun,
        changelog: &[ChangeLogEntry],
        expander: &dyn TemplateExpander,
        log: &dyn BuildLog,
    ) -> Result<Outcome, EngineError> {
        enter(Phase::Init);
        self.config.validate_update_issues()?;
        let Some(site) = self.site() else {
            log.log("No YouTrack site configured");
            enter(Phase::Skipped);
            return Ok(Outcome::Skipped);
        };

        let options = &self.config.update_issues;
        let build = run.info().clone();
        let project = non_empty_or(options.project.as_deref(), &site.project).to_string();
        let command_comment = expander.expand(COMMAND_COMMENT);
        let bundle_field = options.fixed_in_builds_field.as_deref().map(|f| expander.expand(f));
        let build_name = expander.expand(&options.build_name);
        let fixed_states = site.fixed_states();

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

        enter(Phase::Resolving);
        let group = resolve(changelog, &mut session, &fixed_states)?;
        if group.is_empty() {
            session.log("No issues to update");
            enter(Phase::Done);
            return Ok(Outcome::NothingToUpdate);
        }

        enter(Phase::Dispatching);
        let comment = (options.add_comment && site.comments_enabled).then_some(CommentOptions {
            add_commit_summary: options.add_commit_summary,
            description: &options.description,
        });
        let commands: Vec<String> = if site.commands_enabled {
            options.commands.iter().map(|c| expander.expand(c)).collect()
        } else {
            Vec::new()
        };
        let plan = DispatchPlan {
            build: &build,
            comment,
            expander,
            commands: &commands,
            command_comment: &command_comment,
            bundle: bundle_field.as_deref().map(|field| BundleTarget {
                project: &project,
                field,
                build_name: &build_name,
            }),
        };
        let summary = dispatch(&group, &plan, &mut session)?;

        enter(Phase::Done);
        Ok(Outcome::Updated(summary))
    }
}
