//! Changeset-to-issue resolution.

use std::collections::HashMap;

use tracing::debug;

use super::classify::{is_fixed, FixedStates};
use super::extract::extract;
use super::session::TrackerSession;
use crate::error::EngineError;
use crate::model::{ChangeLogEntry, Issue};

/// Issues linked to a build, each with the changelog entries that
/// reference it.
///
/// Issues keep first-seen order; entries within an issue keep changelog
/// order. Issues are keyed by id, so the same issue returned by different
/// searches lands in one bucket.
#[derive(Debug)]
pub struct IssueGroup<'a> {
    changelog: &'a [ChangeLogEntry],
    buckets: Vec<Bucket>,
    index: HashMap<String, usize>,
}

#[derive(Debug)]
struct Bucket {
    issue: Issue,
    entries: Vec<usize>,
}

impl<'a> IssueGroup<'a> {
    /// Creates an empty group over `changelog`.
    #[must_use]
    pub fn new(changelog: &'a [ChangeLogEntry]) -> Self {
        Self { changelog, buckets: Vec::new(), index: HashMap::new() }
    }

    /// Associates the changelog entry at index `entry` with `issue`.
    ///
    /// Returns `false` if that entry was already associated with the issue.
    pub(crate) fn link(&mut self, issue: Issue, entry: usize) -> bool {
        debug_assert!(entry < self.changelog.len());
        if let Some(&slot) = self.index.get(&issue.id) {
            let bucket = &mut self.buckets[slot];
            if bucket.entries.contains(&entry) {
                return false;
            }
            bucket.entries.push(entry);
            return true;
        }
        self.index.insert(issue.id.clone(), self.buckets.len());
        self.buckets.push(Bucket { issue, entries: vec![entry] });
        true
    }

    /// Number of distinct issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if no issue was linked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Issues in first-seen order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.buckets.iter().map(|b| &b.issue)
    }

    /// Each issue with its entries, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Issue, Vec<&'a ChangeLogEntry>)> + '_ {
        self.buckets.iter().map(|b| (&b.issue, self.entries_of(b)))
    }

    fn entries_of(&self, bucket: &Bucket) -> Vec<&'a ChangeLogEntry> {
        let changelog = self.changelog;
        bucket.entries.iter().map(|&i| &changelog[i]).collect()
    }
}

/// Searches the tracker for every changelog entry and groups the results
/// by issue.
///
/// # Errors
///
/// Returns [`EngineError::Interrupted`] if the execution was interrupted.
pub fn resolve<'a>(
    changelog: &'a [ChangeLogEntry],
    session: &mut TrackerSession<'_>,
    fixed_states: &FixedStates,
) -> Result<IssueGroup<'a>, EngineError> {
    let mut group = IssueGroup::new(changelog);

    for (index, entry) in changelog.iter().enumerate() {
        session.log(&format!("Looking for issues about changeset: {}", entry.commit_id));
        let issues = session.search(&extract(&entry.commit_id))?;
        debug!(commit = %entry.commit_id, found = issues.len(), "searched changeset");

        for issue in issues {
            let line = if is_fixed(&issue, fixed_states) {
                format!("- found issue: {} [RESOLVED]", issue.id)
            } else {
                format!("- found issue: {}", issue.id)
            };
            if group.link(issue, index) {
                session.log(&line);
            }
        }
    }

    Ok(group)
}
