//! Command dispatch and handlers.

pub mod build_file;
pub mod create;
pub mod show;
pub mod update;

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::adapters::replaying::ReplayingTracker;
use crate::cli::{Command, RunArgs};
use crate::config::JobConfig;
use crate::context::ServiceContext;
use crate::engine::Outcome;
use crate::error::EngineError;
use crate::model::{BuildRun, BuildStatus};
use crate::record::issue_url_for;
use crate::record::store::RunRecordStore;
use build_file::BuildFile;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::UpdateIssues(args) => update::run(args),
        Command::CreateIssue(args) => create::run(args),
        Command::ShowRecord { record_dir } => show::run(record_dir),
    }
}

/// Everything a tracker action needs, loaded from the CLI arguments.
struct Job {
    config: JobConfig,
    build: BuildFile,
    ctx: ServiceContext,
    store: Option<RunRecordStore>,
}

impl Job {
    /// Loads configuration and build description, and opens the tracker
    /// session cassette.
    ///
    /// When `BUILDLINK_RECORD` is set to a file path, the session is
    /// re-recorded to a cassette at that path.
    fn load(args: &RunArgs) -> Result<Self, String> {
        let config = JobConfig::load(&args.config).map_err(|e| e.to_string())?;
        let build = BuildFile::load(&args.build).map_err(|e| e.to_string())?;

        let ctx = if let Ok(path) = env::var("BUILDLINK_RECORD") {
            let site = config.site.as_ref().map_or("", |s| s.name.as_str());
            let tracker = ReplayingTracker::from_path(&args.tracker).map_err(|e| e.to_string())?;
            ServiceContext::recording(Box::new(tracker), &PathBuf::from(path), site)
        } else {
            ServiceContext::replaying(&args.tracker)?
        };

        let store = args
            .record_dir
            .as_deref()
            .map(RunRecordStore::new)
            .transpose()
            .map_err(|e| e.to_string())?;

        Ok(Self { config, build, ctx, store })
    }

    /// Starts the build run, resuming a persisted record if there is one.
    fn start_run(&self) -> Result<BuildRun, String> {
        let info = self.build.build.clone();
        if let Some(store) = &self.store {
            if let Some(record) = store.load_existing().map_err(|e| e.to_string())? {
                info!(path = %store.path().display(), "resuming run record");
                return Ok(BuildRun::with_record(info, record));
            }
        }
        let issue_url = self.config.site.as_ref().map(|s| issue_url_for(&s.url)).unwrap_or_default();
        Ok(BuildRun::new(info, issue_url))
    }

    /// Persists the run record and turns the engine result into the exit
    /// status the orchestrator sees.
    fn finish(&self, run: BuildRun, result: Result<Outcome, EngineError>) -> Result<(), String> {
        let status = run.status();
        if let (Some(store), Some(record)) = (&self.store, run.into_record()) {
            store.save(&record).map_err(|e| e.to_string())?;
            info!(path = %store.path().display(), commands = record.num_commands(), "saved run record");
        }

        let outcome = result.map_err(|e| e.to_string())?;
        info!(?outcome, "run finished");
        match status {
            BuildStatus::Success => Ok(()),
            BuildStatus::Failure => Err("build marked as failed".to_string()),
        }
    }
}
