//! Runner error types.

/// Errors that stop a migration batch before any record is processed.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading or validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The records file could not be loaded.
    #[error(transparent)]
    Records(#[from] crate::records::RecordsError),

    /// Team lookup or work directory preparation failed.
    #[error(transparent)]
    Migration(#[from] crate::migration::MigrationError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),
}
