//! Replays recorded tracker calls from a cassette.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use super::format::{Cassette, Interaction};

/// Errors raised while loading or replaying a cassette.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The cassette file could not be read.
    #[error("failed to read cassette {path}: {source}")]
    Read {
        /// Cassette path.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The cassette file is not valid YAML.
    #[error("failed to parse cassette {path}: {source}")]
    Parse {
        /// Cassette path.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Every recorded call for the method was already served.
    #[error("cassette exhausted: no more recorded calls for {method} (served {served})")]
    Exhausted {
        /// Method that was called.
        method: String,
        /// Calls already served for it.
        served: usize,
    },
}

/// Serves interactions from a loaded cassette, in order, per method.
pub struct CassetteReplayer {
    queues: HashMap<String, VecDeque<Interaction>>,
    served: HashMap<String, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<String, VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues.entry(interaction.method.clone()).or_default().push_back(interaction.clone());
        }
        Self { queues, served: HashMap::new() }
    }

    /// Load a cassette file and create a replayer for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ReplayError::Read { path: path.display().to_string(), source })?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|source| ReplayError::Parse { path: path.display().to_string(), source })?;
        Ok(Self::new(&cassette))
    }

    /// Return the next interaction recorded for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Exhausted`] when no call for `method` is left.
    pub fn next_interaction(&mut self, method: &str) -> Result<Interaction, ReplayError> {
        let served = self.served.entry(method.to_string()).or_default();
        let next = self.queues.get_mut(method).and_then(VecDeque::pop_front);
        match next {
            Some(interaction) => {
                *served += 1;
                Ok(interaction)
            }
            None => Err(ReplayError::Exhausted { method: method.to_string(), served: *served }),
        }
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
