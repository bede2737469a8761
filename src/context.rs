//! Service context bundling the engine's port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::SystemClock;
use crate::adapters::recording::RecordingTracker;
use crate::adapters::replaying::ReplayingTracker;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::clock::Clock;
use crate::ports::tracker::TrackerClient;

/// Bundles the ports an [`Engine`](crate::engine::Engine) runs against.
///
/// Constructors wire up different adapter implementations (any tracker,
/// a replayed cassette, or a recording wrapper).
pub struct ServiceContext {
    /// Tracker client.
    pub tracker: Box<dyn TrackerClient>,
    /// Clock used to stamp locally produced records.
    pub clock: Box<dyn Clock>,
    /// Optional cassette recorder; saved to disk on drop.
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    #[must_use]
    pub fn new(tracker: Box<dyn TrackerClient>, clock: Box<dyn Clock>) -> Self {
        Self { tracker, clock, recorder: None }
    }

    /// Creates a context whose tracker replays a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let tracker = ReplayingTracker::from_path(path).map_err(|e| e.to_string())?;
        Ok(Self::new(Box::new(tracker), Box::new(SystemClock)))
    }

    /// Wraps `tracker` so every call is recorded to a cassette at `path`.
    ///
    /// The cassette is written when this context is dropped.
    #[must_use]
    pub fn recording(tracker: Box<dyn TrackerClient>, path: &Path, site: &str) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "buildlink-session", site)));
        let tracker = RecordingTracker::new(tracker, Arc::clone(&recorder));
        Self { tracker: Box::new(tracker), clock: Box::new(SystemClock), recorder: Some(recorder) }
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        let Some(recorder) = self.recorder.take() else {
            return;
        };
        let saved = match recorder.lock() {
            Ok(guard) => guard.save(),
            Err(_) => Err(std::io::Error::other("recorder lock poisoned")),
        };
        match saved {
            Ok(path) => info!(path = %path.display(), "tracker session recorded"),
            Err(e) => warn!(error = %e, "failed to write cassette"),
        }
    }
}
