//! The issue-linking and command-dispatch engine.
//!
//! An [`Engine`] is built once per job from its service context and
//! configuration, then run once per build through
//! [`Engine::update_issues`] or [`Engine::create_issue`]. Each run walks
//! the same phases:
//!
//! ```text
//! Init -> Skipped                                         (no site)
//! Init -> Authenticating -> Failed                        (login rejected)
//! Init -> Authenticating -> Authenticated -> Resolving -> Done
//! Init -> Authenticating -> Authenticated -> Resolving -> Dispatching -> Done
//! ```
//!
//! Dispatching never fails as a whole: individual call failures are
//! recorded in the build's run record.

pub mod classify;
pub mod compose;
pub mod create;
pub mod dispatch;
pub mod extract;
pub mod resolve;
pub mod session;
pub mod update;

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::debug;

use crate::config::{JobConfig, SiteConfig};
use crate::context::ServiceContext;
use crate::model::CommandStatus;

pub use dispatch::DispatchSummary;

/// Phase of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has happened yet.
    Init,
    /// No tracker site is configured; nothing was done.
    Skipped,
    /// Logging in.
    Authenticating,
    /// The login was rejected.
    Failed,
    /// Logged in.
    Authenticated,
    /// Searching issues for the changelog.
    Resolving,
    /// Commenting and applying commands.
    Dispatching,
    /// Finished.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Skipped => "skipped",
            Self::Authenticating => "authenticating",
            Self::Failed => "failed",
            Self::Authenticated => "authenticated",
            Self::Resolving => "resolving",
            Self::Dispatching => "dispatching",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No tracker site is configured.
    Skipped,
    /// The changelog was empty or referenced no issue.
    NothingToUpdate,
    /// Linked issues were processed.
    Updated(DispatchSummary),
    /// An issue creation call was made.
    IssueFiled {
        /// Id of the new issue, when the tracker reported one.
        issue_id: Option<String>,
        /// Outcome of the creation call.
        status: CommandStatus,
    },
}

/// Runs tracker actions for builds of one job.
pub struct Engine<'a> {
    ctx: &'a ServiceContext,
    config: &'a JobConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<'a> Engine<'a> {
    /// Creates an engine over the given ports and configuration.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, config: &'a JobConfig) -> Self {
        Self { ctx, config, interrupt: None }
    }

    /// Stops runs cooperatively once `flag` is set. The flag is checked
    /// before every tracker call.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn site(&self) -> Option<&'a SiteConfig> {
        self.config.site.as_ref()
    }

    fn interrupt(&self) -> Option<&AtomicBool> {
        self.interrupt.as_deref()
    }
}

fn enter(phase: Phase) {
    debug!(%phase, "engine phase");
}

/// Returns `value` unless it is absent or empty, else `fallback`.
fn non_empty_or<'v>(value: Option<&'v str>, fallback: &'v str) -> &'v str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}
