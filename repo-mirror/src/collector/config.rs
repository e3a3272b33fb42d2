//! Collector configuration.

use super::CollectError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Default Bitbucket Cloud API base.
pub const DEFAULT_BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Default number of repositories requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Transport whose clone link is captured for each repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneTransport {
    /// `https://` clone links.
    #[default]
    Https,
    /// `git@` clone links.
    Ssh,
}

impl CloneTransport {
    /// Returns the link name Bitbucket uses for this transport.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::Ssh => "ssh",
        }
    }
}

impl fmt::Display for CloneTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloneTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "https" => Ok(Self::Https),
            "ssh" => Ok(Self::Ssh),
            other => Err(format!("unknown transport '{other}', expected 'https' or 'ssh'")),
        }
    }
}

/// Configuration for a collection run.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Bitbucket workspace slug.
    workspace: String,
    /// Bitbucket username.
    username: String,
    /// App password or API token.
    app_password: String,
    /// Which clone link to capture.
    transport: CloneTransport,
    /// Repositories per page.
    page_size: u32,
    /// API base URL.
    api_url: String,
}

impl CollectorConfig {
    /// Creates a configuration with default transport, page size and API URL.
    pub fn new(workspace: String, username: String, app_password: String) -> Self {
        Self {
            workspace,
            username,
            app_password,
            transport: CloneTransport::default(),
            page_size: DEFAULT_PAGE_SIZE,
            api_url: DEFAULT_BITBUCKET_API_URL.to_string(),
        }
    }

    /// Sets the clone transport.
    pub fn with_transport(mut self, transport: CloneTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets a custom API base URL.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Returns the workspace slug.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Returns the Bitbucket username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the app password.
    pub fn app_password(&self) -> &str {
        &self.app_password
    }

    /// Returns the clone transport.
    pub fn transport(&self) -> CloneTransport {
        self.transport
    }

    /// Builds the URL of the first listing page.
    ///
    /// Later pages are taken verbatim from each response's `next` link.
    pub fn first_page_url(&self) -> Result<Url, CollectError> {
        let invalid = |message: &str| CollectError::InvalidUrl {
            url: self.api_url.clone(),
            message: message.to_string(),
        };

        let mut url = Url::parse(&self.api_url).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base"))?
            .pop_if_empty()
            .push("repositories")
            .push(&self.workspace);
        url.query_pairs_mut()
            .append_pair("pagelen", &self.page_size.to_string());

        Ok(url)
    }
}
