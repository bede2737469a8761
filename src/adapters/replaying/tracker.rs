//! Replaying adapter for the `TrackerClient` port.

use std::path::Path;
use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::{CassetteReplayer, ReplayError};
use crate::model::{CommandResult, Issue, User};
use crate::ports::{NewIssue, TrackerClient, TrackerError};

/// Serves tracker results from a cassette, in recorded order per method.
///
/// Call arguments are not compared; a run that makes the same calls in
/// the same order as the recorded one gets the same answers.
pub struct ReplayingTracker {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingTracker {
    /// Creates a tracker backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Creates a tracker from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        Ok(Self::new(CassetteReplayer::load(path)?))
    }

    fn replay<T: DeserializeOwned>(&self, method: &str) -> Result<T, TrackerError> {
        let interaction = self
            .replayer
            .lock()
            .map_err(|_| -> TrackerError { "replayer lock poisoned".into() })?
            .next_interaction(method)?;
        decode(method, interaction.output)
    }
}

/// Decodes the `{"Ok": value}` / `{"Err": message}` convention.
fn decode<T: DeserializeOwned>(method: &str, output: serde_json::Value) -> Result<T, TrackerError> {
    let serde_json::Value::Object(mut map) = output else {
        return Err(format!("{method}: recorded output is not an Ok/Err object").into());
    };
    if let Some(value) = map.remove("Ok") {
        return serde_json::from_value(value)
            .map_err(|e| -> TrackerError { format!("{method}: bad recorded value: {e}").into() });
    }
    match map.remove("Err") {
        Some(serde_json::Value::String(message)) => Err(message.into()),
        Some(other) => Err(other.to_string().into()),
        None => Err(format!("{method}: recorded output has neither Ok nor Err").into()),
    }
}

impl TrackerClient for ReplayingTracker {
    fn login(&self, _username: &str, _password: &str) -> Result<Option<User>, TrackerError> {
        self.replay("login")
    }

    fn search(&self, _user: &User, _query: &str) -> Result<Vec<Issue>, TrackerError> {
        self.replay("search")
    }

    fn create_issue(
        &self,
        _site: &str,
        _user: &User,
        _issue: &NewIssue<'_>,
    ) -> Result<CommandResult, TrackerError> {
        self.replay("create_issue")
    }

    fn comment(
        &self,
        _site: &str,
        _user: &User,
        _issue: &Issue,
        _body: &str,
        _visibility: Option<&str>,
        _silent: bool,
    ) -> Result<Option<CommandResult>, TrackerError> {
        self.replay("comment")
    }

    fn apply_command(
        &self,
        _site: &str,
        _user: &User,
        _issue: &Issue,
        _command: &str,
        _comment: Option<&str>,
        _visibility: Option<&str>,
        _group: Option<&str>,
        _silent: bool,
    ) -> Result<CommandResult, TrackerError> {
        self.replay("apply_command")
    }

    fn build_bundle_name_for_field(
        &self,
        _user: &User,
        _project: &str,
        _field: &str,
    ) -> Result<Option<String>, TrackerError> {
        self.replay("build_bundle_name_for_field")
    }

    fn add_build_to_bundle(
        &self,
        _site: &str,
        _user: &User,
        _bundle: &str,
        _build_name: &str,
    ) -> Result<(), TrackerError> {
        self.replay("add_build_to_bundle")
    }
}
