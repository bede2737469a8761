//! Errors that end an engine execution.
//!
//! Everything a single tracker call can get wrong is captured as a
//! `FAILED` record instead; only these propagate to the orchestrator.

/// Fatal engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The tracker rejected the configured user, or login could not run.
    #[error("Error in YouTrack settings: could not log in as {username}")]
    Authentication {
        /// The configured login.
        username: String,
    },

    /// The orchestrator interrupted the execution.
    #[error("execution interrupted after {completed} tracker calls")]
    Interrupted {
        /// Results recorded before the interrupt.
        completed: usize,
    },

    /// The configuration cannot drive this action.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
