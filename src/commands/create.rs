//! `buildlink create-issue` command.

use crate::adapters::live::{ConsoleLog, VariableExpander};
use crate::cli::RunArgs;
use crate::engine::Engine;

use super::Job;

/// Execute the `create-issue` command.
///
/// # Errors
///
/// Returns an error string if inputs cannot be loaded, the engine stops
/// with an error, or the build ends marked as failed.
pub fn run(args: &RunArgs) -> Result<(), String> {
    let job = Job::load(args)?;
    let mut run = job.start_run()?;
    let expander = VariableExpander::for_build(&job.build.build, &job.build.variables);

    let result = Engine::new(&job.ctx, &job.config).create_issue(&mut run, &expander, &ConsoleLog);

    job.finish(run, result)
}
