//! Repository records exchanged between the collector and the migrator.
//!
//! The collector writes a JSON array of [`RepositoryRecord`] values; the
//! migrator reads it back with [`load_records`].

mod error;

pub use error::RecordsError;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Project name used when a Bitbucket repository has no project.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Default file name of the intermediate records file.
pub const DEFAULT_RECORDS_FILE: &str = "bitbucket_repos.json";

/// A single source repository captured by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Clone URL for the selected transport.
    pub clone_url: String,

    /// Bitbucket project name, or [`UNCATEGORIZED`].
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Repository name as shown in Bitbucket.
    #[serde(default)]
    pub repository_name: String,

    /// Full name in "workspace/repository" format.
    #[serde(default)]
    pub full_name: String,
}

fn default_project_name() -> String {
    UNCATEGORIZED.to_string()
}

impl RepositoryRecord {
    /// Serializes the record as a single compact JSON line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Loads and validates a records file.
///
/// # Errors
///
/// Returns [`RecordsError`] if the file can't be read, isn't a JSON array of
/// records, or contains a record with an empty `clone_url`.
pub fn load_records(path: &Path) -> Result<Vec<RepositoryRecord>, RecordsError> {
    debug!(path = %path.display(), "Loading records");

    let content = std::fs::read_to_string(path).map_err(|e| RecordsError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let records: Vec<RepositoryRecord> =
        serde_json::from_str(&content).map_err(|e| RecordsError::JsonError {
            path: path.display().to_string(),
            source: e,
        })?;

    if let Some(index) = records
        .iter()
        .position(|record| record.clone_url.trim().is_empty())
    {
        return Err(RecordsError::ValidationError {
            path: path.display().to_string(),
            index,
            message: "clone_url is empty".to_string(),
        });
    }

    Ok(records)
}
