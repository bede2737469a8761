//! Domain types shared by the engine, the ports, and the run record.

pub mod build;
pub mod changelog;
pub mod command;
pub mod issue;

pub use build::{BuildInfo, BuildRun, BuildStatus};
pub use changelog::ChangeLogEntry;
pub use command::{CommandResult, CommandStatus};
pub use issue::{Issue, User};
