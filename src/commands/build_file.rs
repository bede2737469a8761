//! The build description the orchestrator hands to the CLI.
//!
//! ```yaml
//! build:
//!   number: 7
//!   tag: jenkins-demo-7
//!   url: https://ci.example.com/job/demo/7/
//!   result: SUCCESS
//! variables:
//!   BRANCH: main
//! changelog:
//!   - commit-id: 3f2a9c1
//!     author: jo
//!     msg: "Fix login #TEST-1"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::{BuildInfo, ChangeLogEntry};

/// One build as seen by the CLI: identity, extra variables, changelog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildFile {
    /// Build identity.
    pub build: BuildInfo,
    /// Variables available to `${NAME}` templates besides the build ones.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Changelog of the build, oldest first.
    #[serde(default)]
    pub changelog: Vec<ChangeLogEntry>,
}

impl BuildFile {
    /// Loads a build description file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}
