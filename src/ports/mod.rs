//! Port traits defining external boundaries.
//!
//! Each trait is a boundary between the engine and something the
//! orchestrator or the tracker owns. Implementations live in `src/adapters/`.

pub mod build_log;
pub mod clock;
pub mod expand;
pub mod tracker;

pub use build_log::BuildLog;
pub use clock::Clock;
pub use expand::TemplateExpander;
pub use tracker::{NewIssue, TrackerClient, TrackerError};
