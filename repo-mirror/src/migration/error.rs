//! Migration error types.

use thiserror::Error;

/// Errors that can occur while migrating a single repository.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// A git command could not be run or exited unsuccessfully.
    #[error("git {command} failed: {message}")]
    GitFailed { command: String, message: String },

    /// The clone URL has no usable final path segment.
    #[error("Cannot derive a repository name from clone URL '{url}'")]
    InvalidCloneUrl { url: String },

    /// An earlier record in the batch already mirrors into the same directory.
    #[error("Mirror directory '{dir_name}' is already used by {other}")]
    DuplicateMirror { dir_name: String, other: String },

    /// The local working directory could not be prepared.
    #[error("Failed to prepare work directory '{path}': {source}")]
    WorkDirError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
