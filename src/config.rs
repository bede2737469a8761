//! Job configuration.
//!
//! One YAML document per job: the tracker site binding plus the options of
//! the two actions (`update-issues` and `create-issue`). Every key has a
//! default except the site's `name` and `url`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::classify::FixedStates;

/// Default issue summary for `create-issue`.
pub const DEFAULT_SUMMARY: &str = "Build ${BUILD_TAG} on Jenkins";
/// Default description for both actions.
pub const DEFAULT_DESCRIPTION: &str =
    "Automatic issue created by Jenkins for build ${BUILD_TAG}: ${BUILD_URL}";
/// Default build name added to the fixed-in-builds bundle.
pub const DEFAULT_BUILD_NAME: &str = "${BUILD_TAG}";
/// Default tracker field holding the fixed-in-builds bundle.
pub const DEFAULT_FIXED_IN_BUILDS_FIELD: &str = "Fixed in builds";
/// Comment suffix sent with every applied command.
pub const COMMAND_COMMENT: &str = "By build ${BUILD_TAG}.";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for this schema.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is present but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete configuration of one job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobConfig {
    /// Tracker site bound to the job. `None` means nothing is configured.
    #[serde(default)]
    pub site: Option<SiteConfig>,
    /// Options of the update-issues action.
    #[serde(default)]
    pub update_issues: UpdateIssuesOptions,
    /// Options of the create-issue action.
    #[serde(default)]
    pub create_issue: CreateIssueOptions,
}

impl JobConfig {
    /// Loads a job configuration file and validates the site.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_yaml(&contents)
    }

    /// Parses a job configuration from YAML text and validates the site.
    ///
    /// Action options are validated by the action that uses them, so a bad
    /// update-issues setting never blocks a create-issue run.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the site is unusable.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate_site()?;
        Ok(config)
    }

    /// Checks the site and the update-issues options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate_update_issues(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.update_issues.validate()
    }

    /// Checks the site only; create-issue options have no constraints
    /// beyond their types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the site is unusable.
    pub fn validate_create_issue(&self) -> Result<(), ConfigError> {
        self.validate_site()
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        self.site.as_ref().map_or(Ok(()), SiteConfig::validate)
    }
}

/// A tracker site binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Display name of the site, passed along with every write call.
    pub name: String,
    /// Base URL of the tracker.
    pub url: String,
    /// Tracker login.
    #[serde(default)]
    pub username: String,
    /// Inline password. Prefer `password-env`.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,
    /// Default project key.
    #[serde(default)]
    pub project: String,
    /// Comma-separated states counted as resolved.
    #[serde(default)]
    pub fixed_values: String,
    /// Whether comments may be posted at all.
    #[serde(default = "enabled")]
    pub comments_enabled: bool,
    /// Whether commands may be applied at all.
    #[serde(default)]
    pub commands_enabled: bool,
    /// Suppress tracker notifications for commands.
    #[serde(default)]
    pub silent_commands: bool,
    /// Suppress tracker notifications for build comments.
    #[serde(default)]
    pub silent_links: bool,
    /// Visibility group for build comments.
    #[serde(default)]
    pub link_visibility: Option<String>,
}

impl SiteConfig {
    /// Creates a site with every optional key at its default.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            username: String::new(),
            password: None,
            password_env: None,
            project: String::new(),
            fixed_values: String::new(),
            comments_enabled: true,
            commands_enabled: false,
            silent_commands: false,
            silent_links: false,
            link_visibility: None,
        }
    }

    /// Resolves the password: inline value first, then the named
    /// environment variable, then empty.
    #[must_use]
    pub fn resolve_password(&self) -> String {
        if let Some(password) = &self.password {
            return password.clone();
        }
        self.password_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Parsed `fixed-values`.
    #[must_use]
    pub fn fixed_states(&self) -> FixedStates {
        FixedStates::parse(&self.fixed_values)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("site name is empty".into()));
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("site {} has no url", self.name)));
        }
        Ok(())
    }
}

/// Options of the update-issues action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateIssuesOptions {
    /// Project key override; falls back to the site project.
    #[serde(default)]
    pub project: Option<String>,
    /// Template appended to build comments. Empty disables it.
    #[serde(default = "default_description")]
    pub description: String,
    /// Post a build comment on each linked issue.
    #[serde(default = "enabled")]
    pub add_comment: bool,
    /// Include the commit summaries in the build comment.
    #[serde(default = "enabled")]
    pub add_commit_summary: bool,
    /// Template of the build name added to the fixed-in-builds bundle.
    #[serde(default = "default_build_name")]
    pub build_name: String,
    /// Template of the tracker field holding the bundle. `None` skips it.
    #[serde(default = "default_fixed_in_builds_field")]
    pub fixed_in_builds_field: Option<String>,
    /// Commands applied to every linked issue, in order.
    #[serde(default)]
    pub commands: Vec<String>,
}

impl Default for UpdateIssuesOptions {
    fn default() -> Self {
        Self {
            project: None,
            description: default_description(),
            add_comment: true,
            add_commit_summary: true,
            build_name: default_build_name(),
            fixed_in_builds_field: default_fixed_in_builds_field(),
            commands: Vec::new(),
        }
    }
}

impl UpdateIssuesOptions {
    /// Starts a builder from the defaults.
    #[must_use]
    pub fn builder() -> UpdateIssuesOptionsBuilder {
        UpdateIssuesOptionsBuilder { options: Self::default() }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self.commands.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("command #{} is blank", pos + 1)));
        }
        Ok(())
    }
}

/// Builder for [`UpdateIssuesOptions`], validated on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct UpdateIssuesOptionsBuilder {
    options: UpdateIssuesOptions,
}

impl UpdateIssuesOptionsBuilder {
    /// Sets the project override.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.options.project = Some(project.into());
        self
    }

    /// Sets the description template.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.options.description = description.into();
        self
    }

    /// Enables or disables the build comment.
    #[must_use]
    pub fn add_comment(mut self, enabled: bool) -> Self {
        self.options.add_comment = enabled;
        self
    }

    /// Enables or disables commit summaries in the comment.
    #[must_use]
    pub fn add_commit_summary(mut self, enabled: bool) -> Self {
        self.options.add_commit_summary = enabled;
        self
    }

    /// Sets the build name template.
    #[must_use]
    pub fn build_name(mut self, build_name: impl Into<String>) -> Self {
        self.options.build_name = build_name.into();
        self
    }

    /// Sets or clears the fixed-in-builds field.
    #[must_use]
    pub fn fixed_in_builds_field(mut self, field: Option<&str>) -> Self {
        self.options.fixed_in_builds_field = field.map(str::to_string);
        self
    }

    /// Replaces the command list.
    #[must_use]
    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Validates and returns the options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a command is blank.
    pub fn build(self) -> Result<UpdateIssuesOptions, ConfigError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Options of the create-issue action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateIssueOptions {
    /// Project key override; falls back to the site project.
    #[serde(default)]
    pub project: Option<String>,
    /// Summary template.
    #[serde(default = "default_summary")]
    pub summary: String,
    /// Description template.
    #[serde(default = "default_description")]
    pub description: String,
    /// Visibility group of the new issue.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Command applied to the new issue.
    #[serde(default)]
    pub command: Option<String>,
    /// Attach the build's console log.
    #[serde(default = "enabled")]
    pub attach_build_log: bool,
}

impl Default for CreateIssueOptions {
    fn default() -> Self {
        Self {
            project: None,
            summary: default_summary(),
            description: default_description(),
            visibility: None,
            command: None,
            attach_build_log: true,
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_summary() -> String {
    DEFAULT_SUMMARY.to_string()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_build_name() -> String {
    DEFAULT_BUILD_NAME.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_fixed_in_builds_field() -> Option<String> {
    Some(DEFAULT_FIXED_IN_BUILDS_FIELD.to_string())
}
