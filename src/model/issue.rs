//! Tracker-side issues and the acting tracker user.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An issue as returned by the tracker.
///
/// Identity is the tracker id alone: two values with the same id compare
/// and hash equal whatever state each search reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-unique identifier, e.g. `TEST-1`.
    pub id: String,
    /// Current workflow state name, e.g. `Fixed`.
    #[serde(default)]
    pub state: String,
}

impl Issue {
    /// Creates an issue value.
    pub fn new(id: impl Into<String>, state: impl Into<String>) -> Self {
        Self { id: id.into(), state: state.into() }
    }
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Issue {}

impl Hash for Issue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A tracker user session returned by `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    pub username: String,
    /// Whether the tracker accepted the credentials.
    pub logged_in: bool,
}

impl User {
    /// Returns `true` when the session is authenticated.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }
}
