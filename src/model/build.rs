//! The build the engine runs for, as seen from the orchestrator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::record::RunRecord;

/// Build identity supplied by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildInfo {
    /// Build number within its job.
    pub number: u64,
    /// Orchestrator build tag, e.g. `jenkins-job-42`.
    pub tag: String,
    /// Absolute URL of the build page.
    pub url: String,
    /// Result label such as `SUCCESS` or `UNSTABLE`.
    pub result: String,
    /// Console log of the build, if one exists on disk.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Overall build status as the engine leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuildStatus {
    /// Nothing marked the build failed.
    #[default]
    Success,
    /// The engine signalled a failure.
    Failure,
}

/// A running build: identity, status, and its lazily attached run record.
#[derive(Debug)]
pub struct BuildRun {
    info: BuildInfo,
    status: BuildStatus,
    record: Option<RunRecord>,
    issue_url: String,
}

impl BuildRun {
    /// Starts tracking a build. `issue_url` is the tracker's issue page
    /// prefix that a run record created for this build will carry.
    pub fn new(info: BuildInfo, issue_url: impl Into<String>) -> Self {
        Self { info, status: BuildStatus::Success, record: None, issue_url: issue_url.into() }
    }

    /// Resumes a build whose run record already exists.
    #[must_use]
    pub fn with_record(info: BuildInfo, record: RunRecord) -> Self {
        let issue_url = record.issue_url().to_string();
        Self { info, status: BuildStatus::Success, record: Some(record), issue_url }
    }

    /// Build identity.
    #[must_use]
    pub fn info(&self) -> &BuildInfo {
        &self.info
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> BuildStatus {
        self.status
    }

    /// Signals failure to the orchestrator.
    pub fn mark_failed(&mut self) {
        self.status = BuildStatus::Failure;
    }

    /// The attached run record, if any tracker call has happened.
    #[must_use]
    pub fn record(&self) -> Option<&RunRecord> {
        self.record.as_ref()
    }

    /// Returns the run record, creating and attaching it on first use.
    pub fn record_mut(&mut self) -> &mut RunRecord {
        let issue_url = &self.issue_url;
        self.record.get_or_insert_with(|| RunRecord::new(issue_url.clone()))
    }

    /// Detaches the run record, e.g. to persist it.
    #[must_use]
    pub fn into_record(self) -> Option<RunRecord> {
        self.record
    }
}
