//! GitHub destination repositories.
//!
//! Thin wrappers over the GitHub REST endpoints used by a migration. The
//! generic octocrab request methods are used so that only the fields the
//! migration needs are deserialized.

use super::MigrationError;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use url::Url;

/// Username GitHub accepts alongside a token in HTTPS remote URLs.
const TOKEN_USERNAME: &str = "x-access-token";

/// How the mirror reaches the destination repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationTransport {
    /// Push over SSH using the caller's keys.
    #[default]
    Ssh,
    /// Push over HTTPS authenticated with the API token.
    Https,
}

impl DestinationTransport {
    /// Returns the transport name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for DestinationTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DestinationTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ssh" => Ok(Self::Ssh),
            "https" => Ok(Self::Https),
            other => Err(format!("unknown transport '{other}', expected 'ssh' or 'https'")),
        }
    }
}

/// A GitHub team, resolved from its slug.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTeam {
    /// Numeric team id, as required by repository creation.
    pub id: u64,

    /// URL-friendly team name.
    pub slug: String,
}

/// A newly created destination repository.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationRepository {
    /// Repository name.
    pub name: String,

    /// Full name in "owner/name" format.
    pub full_name: String,

    /// HTTPS clone URL.
    pub clone_url: String,

    /// SSH clone URL.
    pub ssh_url: String,

    /// Web URL.
    #[serde(default)]
    pub html_url: Option<String>,
}

impl DestinationRepository {
    /// Returns the URL stored as the mirror's `origin`.
    pub fn remote_url(&self, transport: DestinationTransport) -> &str {
        match transport {
            DestinationTransport::Ssh => &self.ssh_url,
            DestinationTransport::Https => &self.clone_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    private: bool,
    team_id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TopicNames {
    names: Vec<String>,
}

/// Looks up a team of `organization` by slug.
///
/// # Errors
///
/// Returns [`MigrationError::GitHubError`] if the team doesn't exist or
/// can't be read with the current token.
pub async fn resolve_team(
    octocrab: &Octocrab,
    organization: &str,
    slug: &str,
) -> Result<GitHubTeam, MigrationError> {
    debug!(organization, team = slug, "Resolving team");
    let team: GitHubTeam = octocrab
        .get(format!("/orgs/{organization}/teams/{slug}"), None::<&()>)
        .await?;
    Ok(team)
}

/// Creates a private repository in `organization` granted to `team`.
pub async fn create_repository(
    octocrab: &Octocrab,
    organization: &str,
    name: &str,
    team: &GitHubTeam,
) -> Result<DestinationRepository, MigrationError> {
    debug!(organization, name, team = %team.slug, "Creating destination repository");
    let request = CreateRepositoryRequest {
        name,
        private: true,
        team_id: team.id,
    };
    let repository: DestinationRepository = octocrab
        .post(format!("/orgs/{organization}/repos"), Some(&request))
        .await?;
    Ok(repository)
}

/// Replaces all topics of `owner/repo` with `topics`.
///
/// # Returns
///
/// The topics GitHub reports after the update.
pub async fn replace_topics(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    topics: &[String],
) -> Result<Vec<String>, MigrationError> {
    debug!(owner, repo, ?topics, "Replacing topics");
    let request = TopicNames {
        names: topics.to_vec(),
    };
    let response: TopicNames = octocrab
        .put(format!("/repos/{owner}/{repo}/topics"), Some(&request))
        .await?;
    Ok(response.names)
}

/// Embeds a token into an HTTP(S) URL for a one-off push.
///
/// Other URL forms are returned unchanged.
pub fn authenticated_url(url: &str, token: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return url.to_string();
    }
    if parsed.set_username(TOKEN_USERNAME).is_err() || parsed.set_password(Some(token)).is_err() {
        return url.to_string();
    }
    parsed.to_string()
}
