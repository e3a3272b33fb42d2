//! Bitbucket repository listing page.

use super::CloneTransport;
use crate::records::{RepositoryRecord, UNCATEGORIZED};
use serde::Deserialize;

/// One page of `GET /repositories/{workspace}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryPage {
    #[serde(default)]
    pub values: Vec<BitbucketRepository>,

    /// Full URL of the next page; absent or empty on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

impl RepositoryPage {
    /// Returns the next page URL, treating an empty string as the end.
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BitbucketRepository {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub links: RepositoryLinks,

    #[serde(default)]
    pub project: Option<ProjectRef>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RepositoryLinks {
    #[serde(default)]
    pub clone: Vec<CloneLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloneLink {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRef {
    #[serde(default)]
    pub name: Option<String>,
}

impl BitbucketRepository {
    /// Converts the repository into a record for the given transport.
    ///
    /// Returns `None` when the repository has no clone link for it.
    pub fn to_record(&self, transport: CloneTransport) -> Option<RepositoryRecord> {
        let clone_url = self
            .links
            .clone
            .iter()
            .find(|link| link.name == transport.as_str())
            .map(|link| link.href.clone())
            .filter(|href| !href.is_empty())?;

        let project_name = self
            .project
            .as_ref()
            .and_then(|project| project.name.clone())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());

        Some(RepositoryRecord {
            clone_url,
            project_name,
            repository_name: self.name.clone(),
            full_name: self.full_name.clone(),
        })
    }
}
