//! Clock port for stamping call records.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Swapped for a fixed clock in tests so synthesised records are
/// reproducible.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
