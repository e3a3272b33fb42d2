//! Runner configuration.

use crate::config::{ConfigError, MirrorSettings};
use crate::migration::{DestinationTransport, DEFAULT_SOURCE_REMOTE};
use std::path::{Path, PathBuf};

/// Configuration for a migration batch.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the records file written by the collector.
    input_path: PathBuf,
    /// Destination GitHub organization.
    organization: String,
    /// Slug of the team granted access to created repositories.
    team: String,
    /// GitHub token used for API calls and HTTPS pushes.
    token: Option<String>,
    /// Directory in which mirror clones are created.
    work_dir: PathBuf,
    /// Name of the remote that keeps pointing at the source.
    source_remote: String,
    /// Transport used to push to GitHub.
    destination_transport: DestinationTransport,
    /// Maximum repositories migrated at once.
    concurrency: usize,
    /// Whether the first failure stops the batch.
    fail_fast: bool,
    /// Whether to preview without cloning or creating anything.
    dry_run: bool,
    /// Custom GitHub API base URL.
    api_url: Option<String>,
}

impl RunnerConfig {
    /// Creates a new configuration with sequential, continue-on-error defaults.
    ///
    /// Live runs also need a token, see [`RunnerConfig::with_token`].
    pub fn new(input_path: PathBuf, organization: String, team: String) -> Self {
        Self {
            input_path,
            organization,
            team,
            token: None,
            work_dir: PathBuf::from("."),
            source_remote: DEFAULT_SOURCE_REMOTE.to_string(),
            destination_transport: DestinationTransport::default(),
            concurrency: 1,
            fail_fast: false,
            dry_run: false,
            api_url: None,
        }
    }

    /// Builds a configuration from merged settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when the organization or
    /// team is missing or blank.
    pub fn from_settings(input_path: PathBuf, settings: MirrorSettings) -> Result<Self, ConfigError> {
        let organization = require(settings.organization, "organization")?;
        let team = require(settings.team, "team")?;

        let mut config = Self::new(input_path, organization, team);
        if let Some(work_dir) = settings.work_dir {
            config.work_dir = work_dir;
        }
        if let Some(source_remote) = settings.source_remote {
            config.source_remote = source_remote;
        }
        if let Some(transport) = settings.destination_transport {
            config.destination_transport = transport;
        }
        Ok(config)
    }

    /// Sets the GitHub token.
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the work directory.
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self
    }

    /// Sets the destination transport.
    pub fn with_destination_transport(mut self, transport: DestinationTransport) -> Self {
        self.destination_transport = transport;
        self
    }

    /// Sets the maximum number of concurrent migrations (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets whether the first failure stops the batch.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Sets dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets a custom GitHub API base URL.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = Some(api_url);
        self
    }

    /// Returns the records file path.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Returns the destination organization.
    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Returns the team slug.
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Returns the configured GitHub token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Checks that everything a live run needs is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when a live run has no
    /// GitHub token. Dry runs never call the API and need none.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dry_run && self.token().is_none_or(|token| token.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: "a GitHub token is required unless --dry-run is set".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the work directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the source remote name.
    pub fn source_remote(&self) -> &str {
        &self.source_remote
    }

    /// Returns the destination transport.
    pub fn destination_transport(&self) -> DestinationTransport {
        self.destination_transport
    }

    /// Returns the max concurrent migrations.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns whether fail-fast mode is enabled.
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the custom GitHub API base URL, if any.
    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

fn require(value: Option<String>, name: &str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::ValidationError {
            message: format!("'{name}' must be set in the config file or on the command line"),
        })
}
