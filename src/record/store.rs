//! On-disk persistence for run records.
//!
//! Each build directory holds at most one record:
//!
//! ```text
//! <build dir>/
//!   youtrack-commands.json
//! ```

use std::{fs, io, path::PathBuf};

use super::RunRecord;

/// File name of a persisted run record inside a build directory.
pub const RECORD_FILE: &str = "youtrack-commands.json";

/// Errors that can occur while loading or saving a run record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The build directory holds no record.
    #[error("no run record in {0}")]
    NotFound(PathBuf),

    /// Reading or writing the record file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The record file is not a valid record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for store operations.
pub type Result<T> = core::result::Result<T, StoreError>;

/// Run record storage for one build directory.
pub struct RunRecordStore {
    dir: PathBuf,
}

impl RunRecordStore {
    /// Opens the store for `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the record file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// Loads the existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the build has no record yet.
    pub fn load(&self) -> Result<RunRecord> {
        let path = self.path();
        if !path.exists() {
            return Err(StoreError::NotFound(self.dir.clone()));
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Loads the existing record, or returns `None` if there is none.
    ///
    /// An existing record is never replaced by a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but cannot be read.
    pub fn load_existing(&self) -> Result<Option<RunRecord>> {
        match self.load() {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes the record, replacing the previous file contents.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, record: &RunRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.path(), json)?;
        Ok(())
    }
}
