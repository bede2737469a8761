//! Cassette data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded tracker call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Tracker method name, e.g. `search` or `apply_command`.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// `{"Ok": value}` or `{"Err": message}`.
    pub output: serde_json::Value,
}

/// A recorded tracker session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Tracker site the session talked to.
    #[serde(default)]
    pub site: String,
    /// Calls in the order they were made.
    pub interactions: Vec<Interaction>,
}
