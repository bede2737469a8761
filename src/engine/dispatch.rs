//! Per-issue dispatch: build comment, configured commands, bundle update.

use tracing::debug;

use super::compose::{compose, CommentOptions};
use super::resolve::IssueGroup;
use super::session::TrackerSession;
use crate::error::EngineError;
use crate::model::{BuildInfo, CommandStatus, Issue};
use crate::ports::TemplateExpander;

/// Where to add the build once an issue has been processed.
#[derive(Debug, Clone, Copy)]
pub struct BundleTarget<'a> {
    /// Project whose field is looked up.
    pub project: &'a str,
    /// Field name, already expanded.
    pub field: &'a str,
    /// Build name, already expanded.
    pub build_name: &'a str,
}

/// What to do for every linked issue.
pub struct DispatchPlan<'a> {
    /// The build being reported.
    pub build: &'a BuildInfo,
    /// Comment settings, or `None` when comments are off.
    pub comment: Option<CommentOptions<'a>>,
    /// Expander for the comment description.
    pub expander: &'a dyn TemplateExpander,
    /// Commands to apply, in order. Empty when commands are off.
    pub commands: &'a [String],
    /// Comment sent along with every command, already expanded.
    pub command_comment: &'a str,
    /// Bundle to add the build to, if configured.
    pub bundle: Option<BundleTarget<'a>>,
}

/// Counts of recorded calls made by one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Issues processed.
    pub issues: usize,
    /// Calls recorded.
    pub attempted: usize,
    /// Calls recorded as `FAILED`.
    pub failed: usize,
}

impl DispatchSummary {
    fn count(&mut self, status: CommandStatus) {
        self.attempted += 1;
        if status == CommandStatus::Failed {
            self.failed += 1;
        }
    }
}

/// Processes every issue of `group` in order.
///
/// Per issue: the build comment, then each command in configured order,
/// then the bundle update. A failed call is recorded and the loop carries
/// on with the next call.
///
/// # Errors
///
/// Returns [`EngineError::Interrupted`] if the execution was interrupted;
/// results recorded so far stay in the run record.
pub fn dispatch(
    group: &IssueGroup<'_>,
    plan: &DispatchPlan<'_>,
    session: &mut TrackerSession<'_>,
) -> Result<DispatchSummary, EngineError> {
    let mut summary = DispatchSummary::default();

    for (issue, entries) in group.iter() {
        summary.issues += 1;

        if let Some(options) = plan.comment {
            let body = compose(plan.build, &entries, options, plan.expander);
            let status = session.comment(issue, &body)?;
            if status == CommandStatus::Ok {
                session.log(&format!("Commented on {}", issue.id));
            } else {
                session.log(&format!("FAILED: Commented on {}", issue.id));
            }
            summary.count(status);
        }

        for status in apply_commands(issue, plan.commands, plan.command_comment, session)? {
            summary.count(status);
        }

        if let Some(bundle) = plan.bundle {
            session.add_build_to_bundle(bundle.project, bundle.field, bundle.build_name)?;
        }
    }

    debug!(?summary, "dispatch finished");
    Ok(summary)
}

/// Applies `commands` to one issue in order, one recorded call each.
///
/// # Errors
///
/// Returns [`EngineError::Interrupted`] if the execution was interrupted.
pub fn apply_commands(
    issue: &Issue,
    commands: &[String],
    comment: &str,
    session: &mut TrackerSession<'_>,
) -> Result<Vec<CommandStatus>, EngineError> {
    let mut statuses = Vec::with_capacity(commands.len());
    for command in commands {
        let attempt = format!("Applying command: {command}, to issue {}", issue.id);
        session.log(&attempt);
        let status = session.apply_command(issue, command, comment)?;
        if status == CommandStatus::Failed {
            session.log(&format!("FAILED: {attempt}"));
        }
        statuses.push(status);
    }
    Ok(statuses)
}
